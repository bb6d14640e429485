//! Plinth State
//!
//! This crate provides the record threaded through one provisioning run.
//! A [`WorkflowState`] is created fresh for every `create_project` call, is
//! owned by the workflow executing that run, and becomes the final report
//! handed back to the caller.
//!
//! Key properties:
//! - Every [`Phase`] has exactly one [`PhaseStatus`] entry from the start
//! - `errors` is append-only
//! - [`OverallStatus`] is only set once all phases have run (or the run aborted)

mod phase;
mod state;

pub use phase::{OverallStatus, Phase, PhaseStatus};
pub use state::{ExtensionOutcome, ExtensionRecord, WorkflowState};
