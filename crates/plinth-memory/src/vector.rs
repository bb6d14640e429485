use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use plinth_services::{
  CollectionInfo, ProfileDocument, ProjectId, ServiceError, VectorInfo, VectorService,
};
use tracing::debug;

use crate::fault::{Faults, Journal};

fn collection_name(id: &ProjectId) -> String {
  format!("project_{}", id)
}

/// In-memory [`VectorService`]. Documents are stored, not embedded.
pub struct MemoryVectorService {
  collections: RwLock<HashMap<ProjectId, Vec<ProfileDocument>>>,
  journal: Journal,
  faults: Faults,
}

impl MemoryVectorService {
  pub fn new(journal: Journal, faults: Faults) -> Self {
    Self {
      collections: RwLock::new(HashMap::new()),
      journal,
      faults,
    }
  }

  pub fn has_collection(&self, id: &ProjectId) -> bool {
    let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
    collections.contains_key(id)
  }

  /// The stored profile document for a project.
  pub fn profile(&self, id: &ProjectId) -> Option<ProfileDocument> {
    let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
    collections.get(id).and_then(|docs| {
      docs
        .iter()
        .find(|doc| doc.vector_id == format!("project_profile_{}", id))
        .cloned()
    })
  }

  fn enter(&self, op: &'static str) -> Result<bool, ServiceError> {
    self.journal.record(op);
    self.faults.apply(op)
  }
}

#[async_trait]
impl VectorService for MemoryVectorService {
  async fn create_collection(&self, id: &ProjectId) -> Result<CollectionInfo, ServiceError> {
    self.enter("vector.create_collection")?;

    let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
    let existed = collections.contains_key(id);
    collections.entry(id.clone()).or_default();

    debug!(project_id = %id, existed, "collection ready");
    Ok(CollectionInfo {
      collection_name: collection_name(id),
      existed,
    })
  }

  async fn store_profile(
    &self,
    id: &ProjectId,
    document: &ProfileDocument,
  ) -> Result<VectorInfo, ServiceError> {
    self.enter("vector.store_profile")?;

    let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
    let docs = collections
      .get_mut(id)
      .ok_or_else(|| ServiceError::NotFound(format!("collection {}", collection_name(id))))?;

    docs.retain(|doc| doc.vector_id != document.vector_id);
    docs.push(document.clone());

    Ok(VectorInfo {
      vector_id: document.vector_id.clone(),
    })
  }

  async fn validate_collection(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("vector.validate_collection")? {
      return Ok(false);
    }
    Ok(self.has_collection(id))
  }

  async fn remove_collection(&self, id: &ProjectId) -> Result<bool, ServiceError> {
    if self.enter("vector.remove_collection")? {
      return Ok(false);
    }
    let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
    Ok(collections.remove(id).is_some())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use plinth_config::Fields;

  fn document(id: &ProjectId, text: &str) -> ProfileDocument {
    ProfileDocument {
      vector_id: format!("project_profile_{}", id),
      text: text.to_string(),
      metadata: Fields::new(),
    }
  }

  #[tokio::test]
  async fn test_store_requires_collection() {
    let service = MemoryVectorService::new(Journal::default(), Faults::default());
    let id = ProjectId::new("p-1");

    let err = service
      .store_profile(&id, &document(&id, "Project: Atlas\n"))
      .await
      .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
  }

  #[tokio::test]
  async fn test_profile_is_replaced_not_duplicated() {
    let service = MemoryVectorService::new(Journal::default(), Faults::default());
    let id = ProjectId::new("p-1");

    let info = service.create_collection(&id).await.unwrap();
    assert_eq!(info.collection_name, "project_p-1");
    assert!(!info.existed);
    assert!(service.create_collection(&id).await.unwrap().existed);

    service
      .store_profile(&id, &document(&id, "first"))
      .await
      .unwrap();
    service
      .store_profile(&id, &document(&id, "second"))
      .await
      .unwrap();

    assert_eq!(service.profile(&id).unwrap().text, "second");
  }
}
