use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use plinth_extension::{ExtensionError, SeoBackend, SeoConfig, TerrainSummary};
use plinth_services::ProjectId;

use crate::fault::{Faults, Journal};

/// In-memory [`SeoBackend`].
///
/// Terrain bootstrapping derives keywords from the seed topics.
pub struct MemorySeoBackend {
  projects: RwLock<HashMap<ProjectId, SeoConfig>>,
  journal: Journal,
  faults: Faults,
}

impl MemorySeoBackend {
  pub fn new(journal: Journal, faults: Faults) -> Self {
    Self {
      projects: RwLock::new(HashMap::new()),
      journal,
      faults,
    }
  }

  /// The config a project was initialized with.
  pub fn config_for(&self, id: &ProjectId) -> Option<SeoConfig> {
    let projects = self.projects.read().unwrap_or_else(|e| e.into_inner());
    projects.get(id).cloned()
  }

  fn enter(&self, op: &'static str) -> Result<bool, ExtensionError> {
    self.journal.record(op);
    Ok(self.faults.apply(op)?)
  }
}

#[async_trait]
impl SeoBackend for MemorySeoBackend {
  async fn initialize(
    &self,
    project_id: &ProjectId,
    config: &SeoConfig,
  ) -> Result<(), ExtensionError> {
    self.enter("seo.initialize")?;
    let mut projects = self.projects.write().unwrap_or_else(|e| e.into_inner());
    projects.insert(project_id.clone(), config.clone());
    Ok(())
  }

  async fn bootstrap_terrain(
    &self,
    project_id: &ProjectId,
    config: &SeoConfig,
  ) -> Result<TerrainSummary, ExtensionError> {
    self.enter("seo.bootstrap_terrain")?;
    if self.config_for(project_id).is_none() {
      return Err(ExtensionError::Backend(format!(
        "seo not initialized for project {}",
        project_id
      )));
    }

    let keywords = config
      .seed_topics
      .iter()
      .flat_map(|topic| [topic.clone(), format!("best {}", topic), format!("{} guide", topic)])
      .collect();
    let opportunities = config
      .seed_topics
      .iter()
      .map(|topic| format!("{} ({})", topic, config.location))
      .collect();

    Ok(TerrainSummary {
      keywords,
      opportunities,
    })
  }

  async fn is_initialized(&self, project_id: &ProjectId) -> Result<bool, ExtensionError> {
    if self.enter("seo.is_initialized")? {
      return Ok(false);
    }
    Ok(self.config_for(project_id).is_some())
  }
}
