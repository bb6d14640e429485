use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use plinth_config::Fields;
use plinth_services::{
  ProjectId, ProjectMetadata, ProjectRecord, SchemaInfo, SchemaService, ServiceError,
};
use tracing::debug;

use crate::fault::{Faults, Journal};

/// Longest schema name kept, leaving headroom under PostgreSQL's 63-byte identifier limit.
const MAX_SCHEMA_NAME: usize = 60;

/// Derive a safe schema name from a project name.
///
/// `"My Garden Blog!"` becomes `"proj_my_garden_blog"`.
pub fn schema_name_for(project_name: &str) -> String {
  let mut name = String::from("proj_");
  let mut in_separator = false;

  for c in project_name.to_lowercase().chars() {
    if c.is_alphanumeric() || c == '_' {
      name.push(c);
      in_separator = false;
    } else if !in_separator {
      name.push('_');
      in_separator = true;
    }
  }

  let mut name: String = name.chars().take(MAX_SCHEMA_NAME).collect();
  while name.ends_with('_') {
    name.pop();
  }
  name
}

#[derive(Default)]
struct SchemaTables {
  schemas: HashMap<ProjectId, String>,
  projects: HashMap<ProjectId, ProjectRecord>,
}

/// In-memory [`SchemaService`].
pub struct MemorySchemaService {
  tables: RwLock<SchemaTables>,
  journal: Journal,
  faults: Faults,
}

impl MemorySchemaService {
  pub fn new(journal: Journal, faults: Faults) -> Self {
    Self {
      tables: RwLock::new(SchemaTables::default()),
      journal,
      faults,
    }
  }

  /// Whether a schema currently exists for the project.
  pub fn has_schema(&self, id: &ProjectId) -> bool {
    let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
    tables.schemas.contains_key(id)
  }

  pub fn schema_count(&self) -> usize {
    let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
    tables.schemas.len()
  }

  fn enter(&self, op: &'static str) -> Result<bool, ServiceError> {
    self.journal.record(op);
    self.faults.apply(op)
  }
}

#[async_trait]
impl SchemaService for MemorySchemaService {
  async fn create_schema(&self, name: &str, _settings: &Fields) -> Result<SchemaInfo, ServiceError> {
    self.enter("schema.create_schema")?;

    let id = ProjectId::new(uuid::Uuid::new_v4().to_string());
    let schema_name = schema_name_for(name);

    let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
    if tables.schemas.values().any(|existing| *existing == schema_name) {
      return Err(ServiceError::Rejected(format!(
        "schema '{}' already exists",
        schema_name
      )));
    }
    tables.schemas.insert(id.clone(), schema_name.clone());

    debug!(project_id = %id, schema = %schema_name, "schema created");
    Ok(SchemaInfo { id, schema_name })
  }

  async fn store_metadata(
    &self,
    id: &ProjectId,
    metadata: &ProjectMetadata,
  ) -> Result<(), ServiceError> {
    self.enter("schema.store_metadata")?;

    let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
    let schema_name = tables
      .schemas
      .get(id)
      .cloned()
      .ok_or_else(|| ServiceError::NotFound(format!("schema for project {}", id)))?;

    tables.projects.insert(
      id.clone(),
      ProjectRecord {
        id: id.clone(),
        name: metadata.name.clone(),
        schema_name,
        description: metadata.description.clone(),
        settings: metadata.settings.clone(),
        created_at: Utc::now(),
      },
    );
    Ok(())
  }

  async fn validate(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("schema.validate")? {
      return Ok(false);
    }
    Ok(self.has_schema(id))
  }

  async fn remove_schema(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("schema.remove_schema")? {
      return Ok(false);
    }

    let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
    tables.projects.remove(id);
    Ok(tables.schemas.remove(id).is_some())
  }

  async fn get_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, ServiceError> {
    self.enter("schema.get_project")?;

    let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
    Ok(tables.projects.get(id).cloned())
  }
}
