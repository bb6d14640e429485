use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use plinth_config::ProjectConfig;
use plinth_services::{ProjectId, SchemaInfo, TemplateSummary};
use serde::{Deserialize, Serialize};

use crate::phase::{OverallStatus, Phase, PhaseStatus};

/// Outcome of a single extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtensionOutcome {
  Completed { result: serde_json::Value },
  Failed { error: String },
}

impl ExtensionOutcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, ExtensionOutcome::Completed { .. })
  }

  /// Whether the extension completed without doing anything, reported as
  /// `{"status": "skipped"}` in its result.
  pub fn is_skipped(&self) -> bool {
    match self {
      ExtensionOutcome::Completed { result } => {
        result.get("status").and_then(serde_json::Value::as_str) == Some("skipped")
      }
      ExtensionOutcome::Failed { .. } => false,
    }
  }
}

/// An extension's outcome, kept in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRecord {
  pub name: String,
  #[serde(flatten)]
  pub outcome: ExtensionOutcome,
}

/// The mutable record of one provisioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
  /// Assigned once the database phase completes.
  pub id: Option<ProjectId>,
  pub config: ProjectConfig,
  pub phase_status: BTreeMap<Phase, PhaseStatus>,
  pub errors: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub extension_results: Vec<ExtensionRecord>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub validation_results: BTreeMap<String, bool>,
  pub overall_status: Option<OverallStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema: Option<SchemaInfo>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub templates: Option<TemplateSummary>,
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
  /// Create a fresh state with every phase pending.
  pub fn new(config: ProjectConfig) -> Self {
    Self {
      id: None,
      config,
      phase_status: Phase::ALL
        .iter()
        .map(|phase| (*phase, PhaseStatus::Pending))
        .collect(),
      errors: Vec::new(),
      extension_results: Vec::new(),
      validation_results: BTreeMap::new(),
      overall_status: None,
      schema: None,
      templates: None,
      started_at: Utc::now(),
      finished_at: None,
    }
  }

  pub fn status(&self, phase: Phase) -> PhaseStatus {
    self.phase_status.get(&phase).copied().unwrap_or_default()
  }

  pub fn set_status(&mut self, phase: Phase, status: PhaseStatus) {
    self.phase_status.insert(phase, status);
  }

  pub fn is_completed(&self, phase: Phase) -> bool {
    self.status(phase) == PhaseStatus::Completed
  }

  /// Append an error message.
  pub fn record_error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
  }

  /// Subsystem phases that have reached `completed`, in execution order.
  pub fn completed_subsystems(&self) -> Vec<Phase> {
    Phase::SUBSYSTEMS
      .into_iter()
      .filter(|phase| self.is_completed(*phase))
      .collect()
  }

  /// Get the first recorded outcome for an extension.
  pub fn extension_result(&self, name: &str) -> Option<&ExtensionOutcome> {
    self
      .extension_results
      .iter()
      .find(|record| record.name == name)
      .map(|record| &record.outcome)
  }

  /// `Success` iff every phase completed, otherwise `Partial`.
  pub fn derive_overall_status(&self) -> OverallStatus {
    if self
      .phase_status
      .values()
      .all(|status| *status == PhaseStatus::Completed)
    {
      OverallStatus::Success
    } else {
      OverallStatus::Partial
    }
  }

  /// Mark the run finished with the given overall status.
  pub fn finish(&mut self, status: OverallStatus) {
    self.overall_status = Some(status);
    self.finished_at = Some(Utc::now());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn state() -> WorkflowState {
    WorkflowState::new(ProjectConfig::new("Garden Blog"))
  }

  #[test]
  fn test_new_state_has_every_phase_pending() {
    let state = state();

    assert_eq!(state.phase_status.len(), Phase::ALL.len());
    assert!(
      state
        .phase_status
        .values()
        .all(|status| *status == PhaseStatus::Pending)
    );
    assert!(state.id.is_none());
    assert!(state.errors.is_empty());
    assert!(state.overall_status.is_none());
  }

  #[test]
  fn test_overall_status_requires_every_phase_completed() {
    let mut state = state();
    for phase in Phase::ALL {
      state.set_status(phase, PhaseStatus::Completed);
    }
    assert_eq!(state.derive_overall_status(), OverallStatus::Success);

    state.set_status(Phase::Extensions, PhaseStatus::Skipped);
    assert_eq!(state.derive_overall_status(), OverallStatus::Partial);
  }

  #[test]
  fn test_completed_subsystems_ignores_non_subsystem_phases() {
    let mut state = state();
    state.set_status(Phase::Database, PhaseStatus::Completed);
    state.set_status(Phase::VectorStore, PhaseStatus::Failed);
    state.set_status(Phase::Templates, PhaseStatus::Completed);
    state.set_status(Phase::Extensions, PhaseStatus::Completed);

    assert_eq!(
      state.completed_subsystems(),
      vec![Phase::Database, Phase::Templates]
    );
  }

  #[test]
  fn test_serializes_phase_names_in_snake_case() {
    let mut state = state();
    state.set_status(Phase::VectorStore, PhaseStatus::Partial);

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["phase_status"]["vector_store"], "partial");
    assert_eq!(json["phase_status"]["database"], "pending");
  }

  #[test]
  fn test_extension_record_flattens_outcome() {
    let record = ExtensionRecord {
      name: "SeoExtension".to_string(),
      outcome: ExtensionOutcome::Failed {
        error: "backend down".to_string(),
      },
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "SeoExtension");
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "backend down");
  }

  #[test]
  fn test_skipped_extension_result() {
    let skipped = ExtensionOutcome::Completed {
      result: serde_json::json!({"status": "skipped", "reason": "not_enabled"}),
    };
    let ran = ExtensionOutcome::Completed {
      result: serde_json::json!({"status": "completed"}),
    };

    assert!(skipped.is_completed() && skipped.is_skipped());
    assert!(!ran.is_skipped());
  }
}
