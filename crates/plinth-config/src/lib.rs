//! Plinth Config
//!
//! This crate contains the serializable project configuration types for plinth.
//! A [`ProjectConfig`] is what a caller submits to provision a new project; it is
//! immutable once handed to a workflow run.
//!
//! Configuration can be loaded from:
//! - JSON files (via CLI with `plinth provision project.json`)
//! - Any JSON blob (via [`ProjectConfig::from_json_str`])

mod error;
mod kind;
mod project;

pub use error::ConfigError;
pub use kind::ProjectKind;
pub use project::{Fields, ProjectConfig};
