use std::fmt;

use chrono::{DateTime, Utc};
use plinth_config::Fields;
use serde::{Deserialize, Serialize};

/// Identifier assigned to a project by the schema service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ProjectId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

/// Result of provisioning a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
  pub id: ProjectId,
  pub schema_name: String,
}

/// Metadata stored alongside the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
  pub name: String,
  pub description: Fields,
  pub settings: Fields,
}

/// A stored project as returned by [`crate::SchemaService::get_project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
  pub id: ProjectId,
  pub name: String,
  pub schema_name: String,
  pub description: Fields,
  pub settings: Fields,
  pub created_at: DateTime<Utc>,
}

/// Result of creating a vector collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
  pub collection_name: String,
  /// `true` if the collection already existed and was reused.
  pub existed: bool,
}

/// The descriptive document embedded as a project's profile vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
  pub vector_id: String,
  pub text: String,
  pub metadata: Fields,
}

/// Result of storing a profile vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorInfo {
  pub vector_id: String,
}

/// Summary returned by template adaptation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
  pub templates_adapted: usize,
  pub templates_skipped: usize,
}
