use std::fmt;

use serde::{Deserialize, Serialize};

/// One named unit of work in the fixed provisioning sequence.
///
/// Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Database,
  VectorStore,
  Templates,
  Extensions,
  Validation,
}

impl Phase {
  pub const ALL: [Phase; 5] = [
    Phase::Database,
    Phase::VectorStore,
    Phase::Templates,
    Phase::Extensions,
    Phase::Validation,
  ];

  /// Phases backed by a collaborator that can be validated and rolled back.
  pub const SUBSYSTEMS: [Phase; 3] = [Phase::Database, Phase::VectorStore, Phase::Templates];

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Database => "database",
      Phase::VectorStore => "vector_store",
      Phase::Templates => "templates",
      Phase::Extensions => "extensions",
      Phase::Validation => "validation",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Status of a single phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
  #[default]
  Pending,
  Completed,
  Failed,
  Skipped,
  Partial,
}

impl fmt::Display for PhaseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      PhaseStatus::Pending => "pending",
      PhaseStatus::Completed => "completed",
      PhaseStatus::Failed => "failed",
      PhaseStatus::Skipped => "skipped",
      PhaseStatus::Partial => "partial",
    };
    f.write_str(s)
  }
}

/// Outcome of a whole provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
  /// Every phase completed.
  Success,
  /// The run finished but at least one phase did not complete.
  Partial,
  /// The run aborted.
  Failed,
}
