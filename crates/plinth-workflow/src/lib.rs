//! Plinth Workflow
//!
//! This crate provides the provisioning workflow: the fixed phase sequence
//! that brings a new project up across its backing stores.
//!
//! # Architecture
//!
//! ```text
//! ProvisioningWorkflow::create_project(config)
//! ├── database      (fatal: failure aborts the run and returns an error)
//! ├── vector_store  ┐
//! ├── templates     │ best effort: failure or panic is recorded,
//! ├── extensions    │ per extension, and the next step still runs
//! └── validation    ┘
//!
//! ProvisioningWorkflow::cleanup(state)
//! └── concurrent removal of every subsystem whose phase completed
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use plinth_workflow::{Collaborators, ProjectWorkflow, ProvisioningWorkflow};
//!
//! let mut workflow = ProvisioningWorkflow::new(Collaborators::new(schema, vector, templates));
//! workflow.register_extension(Arc::new(SeoExtension::new(seo_backend)));
//!
//! let state = workflow.create_project(config).await?;
//! if state.overall_status != Some(OverallStatus::Success) {
//!     eprintln!("errors: {:?}", state.errors);
//! }
//! ```

mod cleanup;
mod error;
mod events;
mod profile;
mod workflow;

pub use cleanup::CleanupReport;
pub use error::{PhaseError, WorkflowError};
pub use events::{ChannelNotifier, NoopNotifier, ProvisioningEvent, ProvisioningNotifier};
pub use profile::render_profile;
pub use workflow::{Collaborators, ProjectWorkflow, ProvisioningWorkflow};
