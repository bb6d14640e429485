use plinth_config::ProjectKind;
use plinth_workflow::WorkflowError;

/// Errors returned by the [`WorkflowRouter`](crate::WorkflowRouter).
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
  #[error("unsupported project type: {0}")]
  UnsupportedKind(ProjectKind),

  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}
