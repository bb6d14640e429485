//! Compensating cleanup.

use plinth_state::Phase;
use serde::{Deserialize, Serialize};

/// What a cleanup pass did for each completed subsystem.
///
/// Cleanup never fails; removal errors are collected here and logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
  /// Subsystems whose resources were removed.
  pub removed: Vec<Phase>,
  /// Subsystems whose collaborator reported nothing to remove.
  pub not_found: Vec<Phase>,
  /// Subsystems whose removal call failed, with the error message.
  pub failed: Vec<(Phase, String)>,
}

impl CleanupReport {
  /// Every subsystem a removal call was issued for.
  pub fn attempted(&self) -> Vec<Phase> {
    let mut phases: Vec<Phase> = self
      .removed
      .iter()
      .chain(self.not_found.iter())
      .chain(self.failed.iter().map(|(phase, _)| phase))
      .copied()
      .collect();
    phases.sort();
    phases
  }

  pub fn is_empty(&self) -> bool {
    self.removed.is_empty() && self.not_found.is_empty() && self.failed.is_empty()
  }
}
