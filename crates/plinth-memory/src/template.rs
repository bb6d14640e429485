use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use plinth_config::Fields;
use plinth_services::{ProjectId, ServiceError, TemplateService, TemplateSummary};
use serde_json::Value;
use tracing::debug;

use crate::fault::{Faults, Journal};

const BASE_TEMPLATES: [&str; 3] = ["article", "outline", "summary"];

/// In-memory [`TemplateService`].
///
/// Adapting copies the base template set for the project's `language`
/// setting. Templates named in the `skip_templates` setting are skipped.
pub struct MemoryTemplateService {
  adapted: RwLock<HashMap<ProjectId, Vec<String>>>,
  journal: Journal,
  faults: Faults,
}

impl MemoryTemplateService {
  pub fn new(journal: Journal, faults: Faults) -> Self {
    Self {
      adapted: RwLock::new(HashMap::new()),
      journal,
      faults,
    }
  }

  /// Adapted template names for a project.
  pub fn templates_for(&self, id: &ProjectId) -> Vec<String> {
    let adapted = self.adapted.read().unwrap_or_else(|e| e.into_inner());
    adapted.get(id).cloned().unwrap_or_default()
  }

  fn enter(&self, op: &'static str) -> Result<bool, ServiceError> {
    self.journal.record(op);
    self.faults.apply(op)
  }
}

#[async_trait]
impl TemplateService for MemoryTemplateService {
  async fn adapt(&self, id: &ProjectId, settings: &Fields) -> Result<TemplateSummary, ServiceError> {
    self.enter("templates.adapt")?;

    let language = settings
      .get("language")
      .and_then(Value::as_str)
      .unwrap_or("en");
    let skip: Vec<&str> = settings
      .get("skip_templates")
      .and_then(Value::as_array)
      .map(|items| items.iter().filter_map(Value::as_str).collect())
      .unwrap_or_default();

    let names: Vec<String> = BASE_TEMPLATES
      .iter()
      .filter(|name| !skip.contains(name))
      .map(|name| format!("{}.{}", name, language))
      .collect();

    let summary = TemplateSummary {
      templates_adapted: names.len(),
      templates_skipped: BASE_TEMPLATES.len() - names.len(),
    };

    debug!(project_id = %id, language, adapted = names.len(), "templates adapted");
    let mut adapted = self.adapted.write().unwrap_or_else(|e| e.into_inner());
    adapted.insert(id.clone(), names);

    Ok(summary)
  }

  async fn validate(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("templates.validate")? {
      return Ok(false);
    }
    Ok(!self.templates_for(id).is_empty())
  }

  async fn remove(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("templates.remove")? {
      return Ok(false);
    }
    let mut adapted = self.adapted.write().unwrap_or_else(|e| e.into_inner());
    Ok(adapted.remove(id).is_some_and(|names| !names.is_empty()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_adapt_honours_language_and_skips() {
    let service = MemoryTemplateService::new(Journal::default(), Faults::default());
    let id = ProjectId::new("p-1");
    let settings = match json!({"language": "de", "skip_templates": ["outline"]}) {
      Value::Object(map) => map,
      _ => unreachable!(),
    };

    let summary = service.adapt(&id, &settings).await.unwrap();

    assert_eq!(summary.templates_adapted, 2);
    assert_eq!(summary.templates_skipped, 1);
    assert_eq!(service.templates_for(&id), vec!["article.de", "summary.de"]);
    assert!(service.validate(&id).await.unwrap());
    assert!(service.remove(&id).await.unwrap());
    assert!(!service.validate(&id).await.unwrap());
  }
}
