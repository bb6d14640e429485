use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::kind::ProjectKind;

/// Free-form key/value map used for project descriptions and settings.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A request to provision a new project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
  #[serde(default)]
  pub description: Fields,
  #[serde(default)]
  pub settings: Fields,
  /// Explicit kind, if the caller supplied one. Use [`ProjectConfig::kind`]
  /// to get the resolved kind.
  #[serde(rename = "type", alias = "kind", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<ProjectKind>,
}

impl ProjectConfig {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }

  pub fn with_description(mut self, description: Fields) -> Self {
    self.description = description;
    self
  }

  pub fn with_settings(mut self, settings: Fields) -> Self {
    self.settings = settings;
    self
  }

  pub fn with_kind(mut self, kind: impl Into<ProjectKind>) -> Self {
    self.kind = Some(kind.into());
    self
  }

  /// The kind this project routes to, falling back to [`ProjectKind::Content`].
  pub fn kind(&self) -> ProjectKind {
    self.kind.clone().unwrap_or_default()
  }

  /// Look up a setting by key.
  pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
    self.settings.get(key)
  }

  /// Parse and validate a config from a JSON document.
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let config: ProjectConfig = serde_json::from_str(json)?;
    if config.name.trim().is_empty() {
      return Err(ConfigError::EmptyName);
    }
    Ok(config)
  }

  /// Read and validate a config from a JSON file.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&content)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_kind_resolves_to_content() {
    let config = ProjectConfig::from_json_str(r#"{"name": "Garden Blog"}"#).unwrap();

    assert_eq!(config.kind, None);
    assert_eq!(config.kind(), ProjectKind::Content);
    assert!(config.description.is_empty());
    assert!(config.settings.is_empty());
  }

  #[test]
  fn test_parses_type_field() {
    let config = ProjectConfig::from_json_str(
      r#"{"name": "Atlas", "type": "research", "settings": {"language": "de"}}"#,
    )
    .unwrap();

    assert_eq!(config.kind(), ProjectKind::Named("research".to_string()));
    assert_eq!(config.setting("language"), Some(&serde_json::json!("de")));
  }

  #[test]
  fn test_accepts_kind_alias() {
    let config = ProjectConfig::from_json_str(r#"{"name": "Atlas", "kind": "content"}"#).unwrap();
    assert_eq!(config.kind, Some(ProjectKind::Content));
  }

  #[test]
  fn test_rejects_blank_name() {
    let err = ProjectConfig::from_json_str(r#"{"name": "  "}"#).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyName));
  }

  #[test]
  fn test_rejects_malformed_json() {
    let err = ProjectConfig::from_json_str("{").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }
}
