//! Plinth Extension
//!
//! Extensions are optional, caller-registered provisioning steps that run
//! after the built-in subsystems (schema, vector store, templates) have been
//! provisioned. Each registered extension is executed once per run, in
//! registration order, during the extensions phase.
//!
//! An extension sees the run's [`WorkflowState`] read-only and returns a
//! result map; the workflow records that map (or the error) under the
//! extension's [`Extension::name`]. One extension failing never stops the
//! others.

mod seo;

pub use seo::{SeoBackend, SeoConfig, SeoExtension, TerrainSummary};

use async_trait::async_trait;
use plinth_config::Fields;
use plinth_services::{ProjectId, ServiceError};
use plinth_state::WorkflowState;

/// Errors an extension can report from [`Extension::execute`].
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
  /// The run has no project id yet.
  #[error("project id has not been assigned")]
  MissingProjectId,

  /// A project setting had an unusable value.
  #[error("invalid setting '{key}': {message}")]
  InvalidSetting { key: String, message: String },

  /// The system the extension provisions against failed.
  #[error("backend error: {0}")]
  Backend(String),

  /// A collaborator call failed.
  #[error(transparent)]
  Service(#[from] ServiceError),
}

/// A pluggable provisioning step.
#[async_trait]
pub trait Extension: Send + Sync {
  /// Name used to report this extension's outcome.
  ///
  /// Defaults to the implementing type's name.
  fn name(&self) -> &str {
    short_type_name(std::any::type_name::<Self>())
  }

  /// Perform the extension's side effects for the project in `state`.
  async fn execute(&self, state: &WorkflowState) -> Result<Fields, ExtensionError>;

  /// Whether the validation phase should call [`Extension::validate`].
  fn requires_validation(&self) -> bool {
    false
  }

  /// Check that this extension's setup is intact for a project.
  async fn validate(&self, _project_id: &ProjectId) -> bool {
    true
  }
}

/// Strip the module path (and any generic arguments) from a type name.
fn short_type_name(full: &'static str) -> &'static str {
  let base = full.split('<').next().unwrap_or(full);
  base.rsplit("::").next().unwrap_or(base)
}
