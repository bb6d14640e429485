//! Plinth Memory
//!
//! In-memory implementations of every collaborator the provisioning workflow
//! drives. They keep their data in process, which makes them suitable for the
//! CLI's dry runs and for tests.
//!
//! All services built by one [`MemoryBackend`] share a [`Journal`] of calls
//! and a set of [`Faults`], so tests can assert on call order across services
//! and make any single operation fail, panic, or report `false`.

mod fault;
mod schema;
mod seo;
mod template;
mod vector;

pub use fault::{Fault, Faults, Journal};
pub use schema::{MemorySchemaService, schema_name_for};
pub use seo::MemorySeoBackend;
pub use template::MemoryTemplateService;
pub use vector::MemoryVectorService;

use std::sync::Arc;

/// A full set of in-memory collaborators sharing one journal and fault set.
#[derive(Clone)]
pub struct MemoryBackend {
  pub schema: Arc<MemorySchemaService>,
  pub vector: Arc<MemoryVectorService>,
  pub templates: Arc<MemoryTemplateService>,
  pub seo: Arc<MemorySeoBackend>,
  pub journal: Journal,
  pub faults: Faults,
}

impl MemoryBackend {
  pub fn new() -> Self {
    let journal = Journal::default();
    let faults = Faults::default();
    Self {
      schema: Arc::new(MemorySchemaService::new(journal.clone(), faults.clone())),
      vector: Arc::new(MemoryVectorService::new(journal.clone(), faults.clone())),
      templates: Arc::new(MemoryTemplateService::new(journal.clone(), faults.clone())),
      seo: Arc::new(MemorySeoBackend::new(journal.clone(), faults.clone())),
      journal,
      faults,
    }
  }
}

impl Default for MemoryBackend {
  fn default() -> Self {
    Self::new()
  }
}
