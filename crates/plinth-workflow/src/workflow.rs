//! The provisioning workflow.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use plinth_config::ProjectConfig;
use plinth_extension::Extension;
use plinth_services::{
  ProjectId, ProjectMetadata, ProjectRecord, SchemaService, ServiceError, TemplateService,
  VectorService,
};
use plinth_state::{
  ExtensionOutcome, ExtensionRecord, OverallStatus, Phase, PhaseStatus, WorkflowState,
};
use tracing::{error, info, instrument, warn};

use crate::cleanup::CleanupReport;
use crate::error::{PhaseError, WorkflowError};
use crate::events::{NoopNotifier, ProvisioningEvent, ProvisioningNotifier};
use crate::profile::render_profile;

/// The collaborators a workflow provisions against.
#[derive(Clone)]
pub struct Collaborators {
  pub schema: Arc<dyn SchemaService>,
  pub vector: Arc<dyn VectorService>,
  pub templates: Arc<dyn TemplateService>,
}

impl Collaborators {
  pub fn new(
    schema: Arc<dyn SchemaService>,
    vector: Arc<dyn VectorService>,
    templates: Arc<dyn TemplateService>,
  ) -> Self {
    Self {
      schema,
      vector,
      templates,
    }
  }
}

/// A workflow that can provision projects of one kind.
///
/// Registration (`register_extension`) takes `&mut self` and is expected to
/// happen before concurrent provisioning starts.
#[async_trait]
pub trait ProjectWorkflow: Send + Sync {
  /// Append an extension. No deduplication; registration order is execution order.
  fn register_extension(&mut self, extension: Arc<dyn Extension>);

  /// Registered extensions, in registration order.
  fn extensions(&self) -> &[Arc<dyn Extension>];

  /// Provision a project and return the run's final state.
  ///
  /// Returns an error only if the run aborts; a returned state may still be
  /// [`OverallStatus::Partial`].
  async fn create_project(&self, config: ProjectConfig) -> Result<WorkflowState, WorkflowError>;

  /// Load a stored project.
  async fn get_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, WorkflowError>;
}

/// The standard provisioning workflow.
///
/// Generic over `N: ProvisioningNotifier` to allow different notification strategies.
/// Use `ProvisioningWorkflow::new()` for no-op notifications, or
/// `ProvisioningWorkflow::with_notifier()` to observe events.
pub struct ProvisioningWorkflow<N: ProvisioningNotifier = NoopNotifier> {
  services: Collaborators,
  extensions: Vec<Arc<dyn Extension>>,
  notifier: N,
}

impl ProvisioningWorkflow<NoopNotifier> {
  /// Create a workflow that discards events.
  pub fn new(services: Collaborators) -> Self {
    Self::with_notifier(services, NoopNotifier)
  }
}

impl<N: ProvisioningNotifier> ProvisioningWorkflow<N> {
  /// Create a workflow with a custom notifier.
  pub fn with_notifier(services: Collaborators, notifier: N) -> Self {
    Self {
      services,
      extensions: Vec::new(),
      notifier,
    }
  }

  pub fn services(&self) -> &Collaborators {
    &self.services
  }

  /// Run the database phase. Failure is fatal to the run.
  async fn provision_schema(&self, state: &mut WorkflowState) -> Result<(), ServiceError> {
    let config = &state.config;
    let result = async {
      let info = self
        .services
        .schema
        .create_schema(&config.name, &config.settings)
        .await?;
      let metadata = ProjectMetadata {
        name: config.name.clone(),
        description: config.description.clone(),
        settings: config.settings.clone(),
      };
      self
        .services
        .schema
        .store_metadata(&info.id, &metadata)
        .await?;
      Ok::<_, ServiceError>(info)
    }
    .await;

    match result {
      Ok(info) => {
        info!(
          project = %state.config.name,
          project_id = %info.id,
          schema = %info.schema_name,
          "database schema created"
        );
        state.id = Some(info.id.clone());
        state.schema = Some(info);
        self.settle_phase(state, Phase::Database, PhaseStatus::Completed);
        Ok(())
      }
      Err(e) => {
        error!(project = %state.config.name, error = %e, "database schema creation failed");
        state.record_error(format!("Database error: {}", e));
        self.settle_phase(state, Phase::Database, PhaseStatus::Failed);
        Err(e)
      }
    }
  }

  /// Run every phase in order. Only a database failure is returned.
  async fn run(&self, state: &mut WorkflowState) -> Result<(), ServiceError> {
    self.provision_schema(state).await?;

    let Some(id) = state.id.clone() else {
      return Ok(());
    };

    self.initialize_vector_store(state, &id).await;
    self.adapt_templates(state, &id).await;
    self.run_extensions(state).await;
    self.validate_project(state, &id).await;
    Ok(())
  }

  async fn initialize_vector_store(&self, state: &mut WorkflowState, id: &ProjectId) {
    let result = isolate(async {
      let document = render_profile(id, &state.config)?;
      self.services.vector.create_collection(id).await?;
      let vector = self.services.vector.store_profile(id, &document).await?;
      Ok::<_, PhaseError>(vector)
    })
    .await;
    let result = into_phase_result(result);

    if let Some(vector) = self.record_phase(state, Phase::VectorStore, "Vector store", result) {
      info!(project_id = %id, vector_id = %vector.vector_id, "vector store initialized");
    }
  }

  async fn adapt_templates(&self, state: &mut WorkflowState, id: &ProjectId) {
    let result = into_phase_result(
      isolate(self.services.templates.adapt(id, &state.config.settings)).await,
    );

    if let Some(summary) = self.record_phase(state, Phase::Templates, "Template", result) {
      info!(
        project_id = %id,
        adapted = summary.templates_adapted,
        skipped = summary.templates_skipped,
        "templates adapted"
      );
      state.templates = Some(summary);
    }
  }

  async fn run_extensions(&self, state: &mut WorkflowState) {
    if self.extensions.is_empty() {
      info!(project = %state.config.name, "no extensions registered");
      self.settle_phase(state, Phase::Extensions, PhaseStatus::Skipped);
      return;
    }

    let mut records = Vec::with_capacity(self.extensions.len());
    let mut errors = Vec::new();

    for extension in &self.extensions {
      let name = extension.name().to_string();
      info!(extension = %name, "running extension");

      let outcome = match flatten_panic(isolate(extension.execute(state)).await) {
        Ok(result) => {
          info!(extension = %name, "extension completed");
          ExtensionOutcome::Completed {
            result: serde_json::Value::Object(result),
          }
        }
        Err(e) => {
          error!(extension = %name, error = %e, "extension failed");
          errors.push(format!("Extension {} error: {}", name, e));
          ExtensionOutcome::Failed {
            error: e.to_string(),
          }
        }
      };

      self.notifier.notify(ProvisioningEvent::ExtensionFinished {
        project: state.config.name.clone(),
        extension: name.clone(),
        succeeded: outcome.is_completed(),
      });
      records.push(ExtensionRecord { name, outcome });
    }

    let succeeded = records.iter().filter(|r| r.outcome.is_completed()).count();
    let status = if succeeded == records.len() {
      PhaseStatus::Completed
    } else if succeeded > 0 {
      PhaseStatus::Partial
    } else {
      PhaseStatus::Failed
    };

    state.extension_results = records;
    for message in errors {
      state.record_error(message);
    }
    self.settle_phase(state, Phase::Extensions, status);
  }

  async fn validate_project(&self, state: &mut WorkflowState, id: &ProjectId) {
    let mut results = BTreeMap::new();

    for phase in state.completed_subsystems() {
      let valid = match flatten_panic(isolate(self.check_subsystem(phase, id)).await) {
        Ok(valid) => valid,
        Err(e) => {
          error!(project_id = %id, phase = %phase, error = %e, "validation check failed");
          state.record_error(format!("Validation error ({}): {}", phase, e));
          false
        }
      };
      results.insert(phase.as_str().to_string(), valid);
    }

    let completed: Vec<Arc<dyn Extension>> = self
      .extensions
      .iter()
      .zip(&state.extension_results)
      .filter(|(extension, record)| {
        extension.requires_validation()
          && record.outcome.is_completed()
          && !record.outcome.is_skipped()
      })
      .map(|(extension, _)| extension.clone())
      .collect();

    for extension in completed {
      let valid = match isolate(extension.validate(id)).await {
        Ok(valid) => valid,
        Err(message) => {
          error!(
            project_id = %id,
            extension = %extension.name(),
            error = %message,
            "extension validation panicked"
          );
          state.record_error(format!(
            "Validation error (extension:{}): panicked: {}",
            extension.name(),
            message
          ));
          false
        }
      };
      results.insert(format!("extension:{}", extension.name()), valid);
    }

    let failed: Vec<&String> = results
      .iter()
      .filter(|(_, valid)| !**valid)
      .map(|(name, _)| name)
      .collect();

    let status = if failed.is_empty() {
      info!(project_id = %id, "validation successful");
      PhaseStatus::Completed
    } else {
      warn!(project_id = %id, failed = ?failed, "validation failed for components");
      PhaseStatus::Failed
    };

    state.validation_results = results;
    self.settle_phase(state, Phase::Validation, status);
  }

  async fn check_subsystem(&self, phase: Phase, id: &ProjectId) -> Result<bool, ServiceError> {
    match phase {
      Phase::Database => self.services.schema.validate(id).await,
      Phase::VectorStore => self.services.vector.validate_collection(id).await,
      Phase::Templates => self.services.templates.validate(id).await,
      Phase::Extensions | Phase::Validation => Ok(true),
    }
  }

  /// Record the outcome of a best-effort phase.
  ///
  /// On failure the phase is marked failed, the error is appended and the run
  /// continues.
  fn record_phase<T>(
    &self,
    state: &mut WorkflowState,
    phase: Phase,
    label: &str,
    result: Result<T, PhaseError>,
  ) -> Option<T> {
    match result {
      Ok(value) => {
        self.settle_phase(state, phase, PhaseStatus::Completed);
        Some(value)
      }
      Err(e) => {
        error!(project = %state.config.name, phase = %phase, error = %e, "phase failed");
        state.record_error(format!("{} error: {}", label, e));
        self.settle_phase(state, phase, PhaseStatus::Failed);
        None
      }
    }
  }

  fn settle_phase(&self, state: &mut WorkflowState, phase: Phase, status: PhaseStatus) {
    state.set_status(phase, status);
    self.notifier.notify(ProvisioningEvent::PhaseFinished {
      project: state.config.name.clone(),
      phase,
      status,
    });
  }

  /// Mark a run failed and compensate whatever already completed.
  async fn abort(&self, state: &mut WorkflowState, message: &str) {
    state.finish(OverallStatus::Failed);
    self.notifier.notify(ProvisioningEvent::ProvisioningAborted {
      project: state.config.name.clone(),
      error: message.to_string(),
    });
    self.cleanup(state).await;
  }

  /// Reverse every subsystem phase whose status is `completed`.
  ///
  /// Removal calls are issued concurrently. Failures are logged and reported,
  /// never returned.
  #[instrument(name = "cleanup", skip_all, fields(project = %state.config.name))]
  pub async fn cleanup(&self, state: &WorkflowState) -> CleanupReport {
    let mut report = CleanupReport::default();

    let Some(id) = state.id.as_ref() else {
      info!("no cleanup needed - project id not assigned yet");
      return report;
    };

    let targets = state.completed_subsystems();
    if targets.is_empty() {
      info!(project_id = %id, "no cleanup needed");
      return report;
    }

    info!(project_id = %id, targets = ?targets, "cleaning up resources for failed project");

    let removals = targets.into_iter().map(|phase| async move {
      let result = match phase {
        Phase::Database => self.services.schema.remove_schema(id).await,
        Phase::VectorStore => self.services.vector.remove_collection(id).await,
        Phase::Templates => self.services.templates.remove(id).await,
        Phase::Extensions | Phase::Validation => Ok(false),
      };
      (phase, result)
    });

    for (phase, result) in futures::future::join_all(removals).await {
      match result {
        Ok(true) => report.removed.push(phase),
        Ok(false) => {
          warn!(project_id = %id, phase = %phase, "nothing to remove");
          report.not_found.push(phase);
        }
        Err(e) => {
          error!(project_id = %id, phase = %phase, error = %e, "cleanup removal failed");
          report.failed.push((phase, e.to_string()));
        }
      }
    }

    info!(project_id = %id, removed = ?report.removed, "cleanup completed");
    self.notifier.notify(ProvisioningEvent::CleanupFinished {
      project_id: id.clone(),
      removed: report.removed.clone(),
    });

    report
  }
}

/// Run a phase step, turning a panic into an error message so one step
/// cannot take down the rest of the run.
async fn isolate<F: Future>(step: F) -> Result<F::Output, String> {
  AssertUnwindSafe(step)
    .catch_unwind()
    .await
    .map_err(|payload| panic_message(payload.as_ref()))
}

fn into_phase_result<T, E>(result: Result<Result<T, E>, String>) -> Result<T, PhaseError>
where
  E: Into<PhaseError>,
{
  match result {
    Ok(inner) => inner.map_err(Into::into),
    Err(message) => Err(PhaseError::Panicked(message)),
  }
}

fn flatten_panic<T, E>(result: Result<Result<T, E>, String>) -> Result<T, String>
where
  E: std::fmt::Display,
{
  match result {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => Err(e.to_string()),
    Err(message) => Err(format!("panicked: {}", message)),
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic".to_string()
  }
}

#[async_trait]
impl<N: ProvisioningNotifier> ProjectWorkflow for ProvisioningWorkflow<N> {
  fn register_extension(&mut self, extension: Arc<dyn Extension>) {
    info!(extension = %extension.name(), "registered extension");
    self.extensions.push(extension);
  }

  fn extensions(&self) -> &[Arc<dyn Extension>] {
    &self.extensions
  }

  #[instrument(name = "create_project", skip_all, fields(project = %config.name))]
  async fn create_project(&self, config: ProjectConfig) -> Result<WorkflowState, WorkflowError> {
    let project = config.name.clone();
    let mut state = WorkflowState::new(config);

    info!(project = %project, "starting project creation");
    self.notifier.notify(ProvisioningEvent::ProvisioningStarted {
      project: project.clone(),
    });

    let outcome = AssertUnwindSafe(self.run(&mut state)).catch_unwind().await;

    match outcome {
      Ok(Ok(())) => {}
      Ok(Err(source)) => {
        self.abort(&mut state, &source.to_string()).await;
        return Err(WorkflowError::Schema {
          project,
          source,
          state: Box::new(state),
        });
      }
      Err(payload) => {
        let message = panic_message(payload.as_ref());
        error!(project = %project, error = %message, "error creating project");
        state.record_error(message.clone());
        self.abort(&mut state, &message).await;
        return Err(WorkflowError::Aborted {
          project,
          message,
          state: Box::new(state),
        });
      }
    }

    let status = state.derive_overall_status();
    state.finish(status);

    match status {
      OverallStatus::Success => {
        info!(project = %project, project_id = ?state.id, "project creation successful");
      }
      _ => {
        warn!(
          project = %project,
          project_id = ?state.id,
          phases = ?state.phase_status,
          "project creation partially successful"
        );
      }
    }

    self.notifier.notify(ProvisioningEvent::ProvisioningFinished {
      project,
      project_id: state.id.clone(),
      status,
    });

    Ok(state)
  }

  async fn get_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, WorkflowError> {
    self
      .services
      .schema
      .get_project(id)
      .await
      .map_err(|source| WorkflowError::Retrieval {
        id: id.clone(),
        source,
      })
  }
}
