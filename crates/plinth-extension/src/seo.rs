//! SEO bootstrap extension.
//!
//! Initializes SEO tracking for a project and optionally seeds its keyword
//! terrain. Driven entirely by project settings:
//!
//! | setting | default | meaning |
//! |---|---|---|
//! | `seo_enabled` | `false` | run at all |
//! | `seed_topics` | `[main_topic]` or `[name]` | topics to seed |
//! | `language` | `"en"` | |
//! | `location` | `"United States"` | |
//! | `bootstrap_seo_terrain` | `false` | also discover keywords |

use std::sync::Arc;

use async_trait::async_trait;
use plinth_config::Fields;
use plinth_services::ProjectId;
use plinth_state::WorkflowState;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{Extension, ExtensionError};

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_LOCATION: &str = "United States";

/// Configuration handed to the SEO backend for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoConfig {
  pub language: String,
  pub location: String,
  pub seed_topics: Vec<String>,
  /// Extension-level options supplied at construction.
  #[serde(default)]
  pub options: Fields,
}

/// Keywords and opportunities discovered while bootstrapping terrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
  pub keywords: Vec<String>,
  pub opportunities: Vec<String>,
}

/// The SEO system the extension provisions against.
#[async_trait]
pub trait SeoBackend: Send + Sync {
  /// Set up SEO tracking for a project.
  async fn initialize(
    &self,
    project_id: &ProjectId,
    config: &SeoConfig,
  ) -> Result<(), ExtensionError>;

  /// Discover the initial keyword terrain for the seed topics.
  async fn bootstrap_terrain(
    &self,
    project_id: &ProjectId,
    config: &SeoConfig,
  ) -> Result<TerrainSummary, ExtensionError>;

  /// Whether SEO tracking exists for a project.
  async fn is_initialized(&self, project_id: &ProjectId) -> Result<bool, ExtensionError>;
}

/// Extension that initializes SEO tracking during provisioning.
pub struct SeoExtension {
  backend: Arc<dyn SeoBackend>,
  options: Fields,
}

impl SeoExtension {
  pub fn new(backend: Arc<dyn SeoBackend>) -> Self {
    Self::with_options(backend, Fields::new())
  }

  /// Create the extension with options merged into every [`SeoConfig`].
  pub fn with_options(backend: Arc<dyn SeoBackend>, options: Fields) -> Self {
    Self { backend, options }
  }

  fn seo_config(&self, state: &WorkflowState) -> Result<SeoConfig, ExtensionError> {
    let settings = &state.config.settings;

    let mut seed_topics = match settings.get("seed_topics") {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| {
          item
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExtensionError::InvalidSetting {
              key: "seed_topics".to_string(),
              message: format!("expected a list of strings, found {}", item),
            })
        })
        .collect::<Result<Vec<_>, _>>()?,
      Some(other) => {
        return Err(ExtensionError::InvalidSetting {
          key: "seed_topics".to_string(),
          message: format!("expected a list of strings, found {}", other),
        });
      }
    };

    if seed_topics.is_empty()
      && let Some(topic) = settings.get("main_topic").and_then(Value::as_str)
    {
      seed_topics.push(topic.to_string());
    }

    if seed_topics.is_empty() {
      warn!(
        project = %state.config.name,
        "no seed topics configured, seeding with project name"
      );
      seed_topics.push(state.config.name.clone());
    }

    Ok(SeoConfig {
      language: string_setting(settings, "language", DEFAULT_LANGUAGE),
      location: string_setting(settings, "location", DEFAULT_LOCATION),
      seed_topics,
      options: self.options.clone(),
    })
  }
}

fn string_setting(settings: &Fields, key: &str, default: &str) -> String {
  settings
    .get(key)
    .and_then(Value::as_str)
    .unwrap_or(default)
    .to_string()
}

fn bool_setting(settings: &Fields, key: &str) -> bool {
  settings.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn into_fields(value: Value) -> Fields {
  match value {
    Value::Object(map) => map,
    _ => Fields::new(),
  }
}

#[async_trait]
impl Extension for SeoExtension {
  fn name(&self) -> &str {
    "SeoExtension"
  }

  async fn execute(&self, state: &WorkflowState) -> Result<Fields, ExtensionError> {
    let project_id = state.id.as_ref().ok_or(ExtensionError::MissingProjectId)?;
    let settings = &state.config.settings;

    if !bool_setting(settings, "seo_enabled") {
      info!(project_id = %project_id, "seo initialization skipped (not enabled)");
      return Ok(into_fields(json!({
        "status": "skipped",
        "reason": "not_enabled",
      })));
    }

    let config = self.seo_config(state)?;
    self.backend.initialize(project_id, &config).await?;

    if !bool_setting(settings, "bootstrap_seo_terrain") {
      info!(project_id = %project_id, "seo initialized (terrain bootstrap skipped)");
      return Ok(into_fields(json!({
        "status": "completed",
        "terrain_bootstrapped": false,
      })));
    }

    let terrain = self.backend.bootstrap_terrain(project_id, &config).await?;
    info!(
      project_id = %project_id,
      seed_topics = config.seed_topics.len(),
      keywords = terrain.keywords.len(),
      "seo terrain bootstrapped"
    );

    Ok(into_fields(json!({
      "status": "completed",
      "terrain_bootstrapped": true,
      "keywords_found": terrain.keywords.len(),
      "opportunities_found": terrain.opportunities.len(),
    })))
  }

  fn requires_validation(&self) -> bool {
    true
  }

  async fn validate(&self, project_id: &ProjectId) -> bool {
    match self.backend.is_initialized(project_id).await {
      Ok(true) => true,
      Ok(false) => {
        warn!(project_id = %project_id, "seo validation failed: project not initialized");
        false
      }
      Err(e) => {
        warn!(project_id = %project_id, error = %e, "seo validation failed");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use plinth_config::ProjectConfig;
  use tokio::sync::Mutex;

  #[derive(Default)]
  struct StubBackend {
    initialized: Mutex<Vec<(ProjectId, SeoConfig)>>,
    fail_initialize: bool,
  }

  #[async_trait]
  impl SeoBackend for StubBackend {
    async fn initialize(
      &self,
      project_id: &ProjectId,
      config: &SeoConfig,
    ) -> Result<(), ExtensionError> {
      if self.fail_initialize {
        return Err(ExtensionError::Backend("seo store offline".to_string()));
      }
      self
        .initialized
        .lock()
        .await
        .push((project_id.clone(), config.clone()));
      Ok(())
    }

    async fn bootstrap_terrain(
      &self,
      _project_id: &ProjectId,
      config: &SeoConfig,
    ) -> Result<TerrainSummary, ExtensionError> {
      Ok(TerrainSummary {
        keywords: config
          .seed_topics
          .iter()
          .map(|t| format!("{} tips", t))
          .collect(),
        opportunities: vec!["long-tail".to_string()],
      })
    }

    async fn is_initialized(&self, project_id: &ProjectId) -> Result<bool, ExtensionError> {
      Ok(
        self
          .initialized
          .lock()
          .await
          .iter()
          .any(|(id, _)| id == project_id),
      )
    }
  }

  fn state_with(settings: Value) -> WorkflowState {
    let config = ProjectConfig::new("Garden Blog").with_settings(into_fields(settings));
    let mut state = WorkflowState::new(config);
    state.id = Some(ProjectId::new("p-1"));
    state
  }

  #[tokio::test]
  async fn test_skips_when_not_enabled() {
    let backend = Arc::new(StubBackend::default());
    let ext = SeoExtension::new(backend.clone());

    let result = ext.execute(&state_with(json!({}))).await.unwrap();

    assert_eq!(result["status"], "skipped");
    assert_eq!(result["reason"], "not_enabled");
    assert!(backend.initialized.lock().await.is_empty());
  }

  #[tokio::test]
  async fn test_seed_topics_fall_back_to_main_topic_then_name() {
    let backend = Arc::new(StubBackend::default());
    let ext = SeoExtension::new(backend.clone());

    ext
      .execute(&state_with(
        json!({"seo_enabled": true, "main_topic": "composting"}),
      ))
      .await
      .unwrap();
    ext
      .execute(&state_with(json!({"seo_enabled": true})))
      .await
      .unwrap();

    let calls = backend.initialized.lock().await;
    assert_eq!(calls[0].1.seed_topics, vec!["composting"]);
    assert_eq!(calls[1].1.seed_topics, vec!["Garden Blog"]);
    assert_eq!(calls[1].1.language, "en");
    assert_eq!(calls[1].1.location, "United States");
  }

  #[tokio::test]
  async fn test_bootstraps_terrain_when_requested() {
    let backend = Arc::new(StubBackend::default());
    let ext = SeoExtension::new(backend);

    let result = ext
      .execute(&state_with(json!({
        "seo_enabled": true,
        "bootstrap_seo_terrain": true,
        "seed_topics": ["roses", "tulips"],
        "language": "nl",
      })))
      .await
      .unwrap();

    assert_eq!(result["terrain_bootstrapped"], true);
    assert_eq!(result["keywords_found"], 2);
    assert_eq!(result["opportunities_found"], 1);
  }

  #[tokio::test]
  async fn test_rejects_non_string_seed_topics() {
    let ext = SeoExtension::new(Arc::new(StubBackend::default()));

    let err = ext
      .execute(&state_with(json!({"seo_enabled": true, "seed_topics": [1, 2]})))
      .await
      .unwrap_err();

    assert!(matches!(err, ExtensionError::InvalidSetting { ref key, .. } if key == "seed_topics"));
  }

  #[tokio::test]
  async fn test_backend_failure_is_returned() {
    let backend = Arc::new(StubBackend {
      fail_initialize: true,
      ..Default::default()
    });
    let ext = SeoExtension::new(backend);

    let err = ext
      .execute(&state_with(json!({"seo_enabled": true})))
      .await
      .unwrap_err();

    assert!(matches!(err, ExtensionError::Backend(_)));
  }

  #[tokio::test]
  async fn test_validate_checks_backend() {
    let backend = Arc::new(StubBackend::default());
    let ext = SeoExtension::new(backend);
    let id = ProjectId::new("p-1");

    assert!(ext.requires_validation());
    assert!(!ext.validate(&id).await);

    ext
      .execute(&state_with(json!({"seo_enabled": true})))
      .await
      .unwrap();
    assert!(ext.validate(&id).await);
  }
}
