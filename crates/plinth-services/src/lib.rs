//! Plinth Services
//!
//! This crate defines the collaborator capabilities the provisioning workflow
//! drives. Each backing store a project needs is reached through one trait:
//!
//! - [`SchemaService`] provisions the relational schema and stores project metadata
//! - [`VectorService`] creates the embedding collection and stores the project profile
//! - [`TemplateService`] adapts the template set to the project's settings
//!
//! Implementations own the real storage logic (DDL, vector clients, template
//! adaptation). The workflow only distinguishes success from failure and never
//! inspects [`ServiceError`] variants.

mod types;

pub use types::{
  CollectionInfo, ProfileDocument, ProjectId, ProjectMetadata, ProjectRecord, SchemaInfo,
  TemplateSummary, VectorInfo,
};

use async_trait::async_trait;
use plinth_config::Fields;

/// Error type for collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  /// The backing store could not be reached.
  #[error("service unavailable: {0}")]
  Unavailable(String),

  /// The requested project or resource does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The backing store refused the request.
  #[error("rejected: {0}")]
  Rejected(String),

  /// Any other implementation-defined failure.
  #[error("{0}")]
  Other(String),
}

/// Relational schema provisioning.
#[async_trait]
pub trait SchemaService: Send + Sync {
  /// Provision a schema for a new project and assign its id.
  async fn create_schema(&self, name: &str, settings: &Fields) -> Result<SchemaInfo, ServiceError>;

  /// Persist the project's metadata row.
  async fn store_metadata(
    &self,
    id: &ProjectId,
    metadata: &ProjectMetadata,
  ) -> Result<(), ServiceError>;

  /// Check that the schema for a project is intact.
  async fn validate(&self, id: &ProjectId) -> Result<bool, ServiceError>;

  /// Drop a project's schema. Returns `false` if there was nothing to drop.
  async fn remove_schema(&self, id: &ProjectId) -> Result<bool, ServiceError>;

  /// Load stored project metadata.
  async fn get_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, ServiceError>;
}

/// Vector-embedding collection provisioning.
#[async_trait]
pub trait VectorService: Send + Sync {
  /// Create the collection keyed by the project id.
  async fn create_collection(&self, id: &ProjectId) -> Result<CollectionInfo, ServiceError>;

  /// Embed and store the project's profile document.
  async fn store_profile(
    &self,
    id: &ProjectId,
    document: &ProfileDocument,
  ) -> Result<VectorInfo, ServiceError>;

  /// Check that the project's collection exists and is usable.
  async fn validate_collection(&self, id: &ProjectId) -> Result<bool, ServiceError>;

  /// Delete the project's collection. Returns `false` if there was nothing to delete.
  async fn remove_collection(&self, id: &ProjectId) -> Result<bool, ServiceError>;
}

/// Template set adaptation.
#[async_trait]
pub trait TemplateService: Send + Sync {
  /// Adapt the template set for a project.
  async fn adapt(&self, id: &ProjectId, settings: &Fields) -> Result<TemplateSummary, ServiceError>;

  /// Check that adapted templates exist for the project.
  async fn validate(&self, id: &ProjectId) -> Result<bool, ServiceError>;

  /// Remove the project's adapted templates. Returns `false` if none existed.
  async fn remove(&self, id: &ProjectId) -> Result<bool, ServiceError>;
}
