//! Provisioning events and notifiers for observability.
//!
//! Events are emitted during a provisioning run to allow consumers to observe
//! progress, persist audit trails, stream to UIs, etc.

use plinth_services::ProjectId;
use plinth_state::{OverallStatus, Phase, PhaseStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a provisioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProvisioningEvent {
  /// A run has started.
  ProvisioningStarted { project: String },

  /// A phase has settled.
  PhaseFinished {
    project: String,
    phase: Phase,
    status: PhaseStatus,
  },

  /// A single extension has run.
  ExtensionFinished {
    project: String,
    extension: String,
    succeeded: bool,
  },

  /// A run has finished and produced a report.
  ProvisioningFinished {
    project: String,
    project_id: Option<ProjectId>,
    status: OverallStatus,
  },

  /// A run has aborted with an error.
  ProvisioningAborted { project: String, error: String },

  /// Compensating cleanup has finished.
  CleanupFinished {
    project_id: ProjectId,
    removed: Vec<Phase>,
  },
}

/// Trait for receiving provisioning events.
///
/// The workflow calls `notify` for each event - implementations decide
/// what to do with them (persist, broadcast, log, ignore, etc.).
pub trait ProvisioningNotifier: Send + Sync {
  /// Called when a provisioning event occurs.
  fn notify(&self, event: ProvisioningEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ProvisioningNotifier for NoopNotifier {
  fn notify(&self, _event: ProvisioningEvent) {}
}

/// A notifier that sends events to an unbounded channel.
///
/// Event volume is a handful per run, so an unbounded channel never holds
/// much and never blocks the workflow on a slow consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ProvisioningEvent>,
}

impl ChannelNotifier {
  /// Create a new channel notifier.
  pub fn new(sender: mpsc::UnboundedSender<ProvisioningEvent>) -> Self {
    Self { sender }
  }
}

impl ProvisioningNotifier for ChannelNotifier {
  fn notify(&self, event: ProvisioningEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
