//! Workflow errors.

use plinth_services::{ProjectId, ServiceError};
use plinth_state::WorkflowState;

/// Errors that abort a provisioning run or a lookup.
///
/// The run-aborting variants carry the final [`WorkflowState`] so callers can
/// still report which phases completed.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
  /// The mandatory database phase failed.
  #[error("database phase failed for project '{project}': {source}")]
  Schema {
    project: String,
    #[source]
    source: ServiceError,
    state: Box<WorkflowState>,
  },

  /// A failure escaped the phase wrappers.
  #[error("provisioning aborted for project '{project}': {message}")]
  Aborted {
    project: String,
    message: String,
    state: Box<WorkflowState>,
  },

  /// Loading a stored project failed.
  #[error("failed to load project '{id}': {source}")]
  Retrieval {
    id: ProjectId,
    #[source]
    source: ServiceError,
  },
}

impl WorkflowError {
  /// The state of the aborted run, if this error ended one.
  pub fn state(&self) -> Option<&WorkflowState> {
    match self {
      WorkflowError::Schema { state, .. } | WorkflowError::Aborted { state, .. } => Some(state),
      WorkflowError::Retrieval { .. } => None,
    }
  }
}

/// A non-fatal failure inside one phase.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
  #[error(transparent)]
  Service(#[from] ServiceError),

  #[error("failed to render profile document: {0}")]
  Profile(#[from] minijinja::Error),

  #[error("panicked: {0}")]
  Panicked(String),
}
