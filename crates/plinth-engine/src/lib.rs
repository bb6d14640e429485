//! Plinth Engine
//!
//! Entry point for provisioning. The [`WorkflowRouter`] owns one
//! [`ProjectWorkflow`] per [`ProjectKind`] and dispatches each request to the
//! workflow for the project's kind.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowRouter                         │
//! │  - kind → workflow map, "content" registered at startup     │
//! │  - register_extension(ext, kind | all)                      │
//! │  - create_project(config) → ProvisionedProject              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ProvisioningWorkflow                      │
//! │  - database → vector store → templates → extensions         │
//! │    → validation, with cleanup on abort                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use plinth_engine::{Collaborators, WorkflowRouter};
//!
//! let mut router = WorkflowRouter::new(Collaborators::new(schema, vector, templates));
//! router.register_extension(Arc::new(SeoExtension::new(seo_backend)), None);
//!
//! let project = router.create_project(config).await?;
//! println!("{} project {:?}: {:?}", project.kind, project.state.id, project.state.overall_status);
//! ```

mod error;
mod router;

pub use error::RouterError;
pub use router::{ProvisionedProject, WorkflowRouter};

// Re-export the pieces callers need to build and drive a router.
pub use plinth_config::{ProjectConfig, ProjectKind};
pub use plinth_workflow::{
  ChannelNotifier, CleanupReport, Collaborators, NoopNotifier, ProjectWorkflow,
  ProvisioningEvent, ProvisioningNotifier, ProvisioningWorkflow, WorkflowError,
};
