//! Routing of provisioning requests by project kind.

use std::collections::HashMap;
use std::sync::Arc;

use plinth_config::{ProjectConfig, ProjectKind};
use plinth_extension::Extension;
use plinth_services::{ProjectId, ProjectRecord};
use plinth_state::WorkflowState;
use plinth_workflow::{Collaborators, ProjectWorkflow, ProvisioningWorkflow};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::RouterError;

/// A finished provisioning run, tagged with the kind that handled it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedProject {
  #[serde(rename = "type")]
  pub kind: ProjectKind,
  #[serde(flatten)]
  pub state: WorkflowState,
}

/// Dispatches provisioning requests to the workflow registered for each kind.
///
/// Registration takes `&mut self`; build the router fully before sharing it.
pub struct WorkflowRouter {
  workflows: HashMap<ProjectKind, Box<dyn ProjectWorkflow>>,
}

impl WorkflowRouter {
  /// Create a router with the standard workflow registered for
  /// [`ProjectKind::Content`].
  pub fn new(services: Collaborators) -> Self {
    let mut router = Self::empty();
    router.register_workflow(
      ProjectKind::Content,
      Box::new(ProvisioningWorkflow::new(services)),
    );
    router
  }

  /// Create a router with no workflows.
  pub fn empty() -> Self {
    Self {
      workflows: HashMap::new(),
    }
  }

  /// Register the workflow for a kind, replacing any existing one.
  pub fn register_workflow(&mut self, kind: ProjectKind, workflow: Box<dyn ProjectWorkflow>) {
    if self.workflows.insert(kind.clone(), workflow).is_some() {
      info!(kind = %kind, "replaced workflow");
    } else {
      info!(kind = %kind, "registered workflow");
    }
  }

  /// Register an extension with one workflow, or with every workflow when
  /// `kind` is `None`.
  ///
  /// An unknown kind is logged and ignored.
  pub fn register_extension(&mut self, extension: Arc<dyn Extension>, kind: Option<ProjectKind>) {
    match kind {
      Some(kind) => match self.workflows.get_mut(&kind) {
        Some(workflow) => {
          info!(extension = %extension.name(), kind = %kind, "registering extension");
          workflow.register_extension(extension);
        }
        None => {
          warn!(
            extension = %extension.name(),
            kind = %kind,
            "no workflow registered for kind, extension ignored"
          );
        }
      },
      None => {
        info!(extension = %extension.name(), "registering extension with all workflows");
        for workflow in self.workflows.values_mut() {
          workflow.register_extension(extension.clone());
        }
      }
    }
  }

  pub fn workflow(&self, kind: &ProjectKind) -> Option<&dyn ProjectWorkflow> {
    self.workflows.get(kind).map(|workflow| workflow.as_ref())
  }

  /// Registered kinds, sorted by name.
  pub fn kinds(&self) -> Vec<&ProjectKind> {
    let mut kinds: Vec<&ProjectKind> = self.workflows.keys().collect();
    kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    kinds
  }

  /// Provision a project with the workflow for its kind.
  ///
  /// Projects without a kind are provisioned as [`ProjectKind::Content`].
  #[instrument(name = "route_project", skip_all, fields(project = %config.name))]
  pub async fn create_project(
    &self,
    config: ProjectConfig,
  ) -> Result<ProvisionedProject, RouterError> {
    let kind = config.kind();
    let Some(workflow) = self.workflows.get(&kind) else {
      warn!(kind = %kind, "unsupported project type");
      return Err(RouterError::UnsupportedKind(kind));
    };

    info!(kind = %kind, "routing project to workflow");
    let state = workflow.create_project(config).await?;

    Ok(ProvisionedProject { kind, state })
  }

  /// Load a stored project.
  ///
  /// Lookups always go through the content workflow; every kind shares the
  /// same schema service.
  pub async fn get_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RouterError> {
    let Some(workflow) = self.workflows.get(&ProjectKind::Content) else {
      return Err(RouterError::UnsupportedKind(ProjectKind::Content));
    };
    Ok(workflow.get_project(id).await?)
  }
}
