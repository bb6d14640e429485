use std::sync::Arc;

use async_trait::async_trait;
use plinth_config::Fields;
use plinth_engine::{
  Collaborators, ProjectConfig, ProjectKind, ProvisioningWorkflow, RouterError, WorkflowRouter,
};
use plinth_extension::{Extension, ExtensionError, SeoExtension};
use plinth_memory::{Fault, MemoryBackend};
use plinth_state::{OverallStatus, Phase, PhaseStatus, WorkflowState};
use serde_json::json;

fn collaborators(backend: &MemoryBackend) -> Collaborators {
  Collaborators::new(
    backend.schema.clone(),
    backend.vector.clone(),
    backend.templates.clone(),
  )
}

struct Marker(&'static str);

#[async_trait]
impl Extension for Marker {
  fn name(&self) -> &str {
    self.0
  }

  async fn execute(&self, _state: &WorkflowState) -> Result<Fields, ExtensionError> {
    Ok(Fields::new())
  }
}

#[tokio::test]
async fn test_missing_kind_routes_like_content() {
  let backend = MemoryBackend::new();
  let router = WorkflowRouter::new(collaborators(&backend));

  let implicit = router
    .create_project(ProjectConfig::new("Garden Blog"))
    .await
    .unwrap();
  let explicit = router
    .create_project(ProjectConfig::new("Herb Blog").with_kind("content"))
    .await
    .unwrap();

  assert_eq!(implicit.kind, ProjectKind::Content);
  assert_eq!(explicit.kind, ProjectKind::Content);
  assert_eq!(implicit.state.phase_status, explicit.state.phase_status);
  assert_eq!(implicit.state.overall_status, explicit.state.overall_status);
}

#[tokio::test]
async fn test_unsupported_kind_calls_no_workflow() {
  let backend = MemoryBackend::new();
  let router = WorkflowRouter::new(collaborators(&backend));

  let err = router
    .create_project(ProjectConfig::new("Shop").with_kind("ecommerce"))
    .await
    .unwrap_err();

  assert!(matches!(err, RouterError::UnsupportedKind(ref kind) if kind.as_str() == "ecommerce"));
  assert_eq!(err.to_string(), "unsupported project type: ecommerce");
  assert!(backend.journal.calls().is_empty());
}

#[tokio::test]
async fn test_registered_kind_gets_its_own_workflow() {
  let content = MemoryBackend::new();
  let shop = MemoryBackend::new();
  let mut router = WorkflowRouter::new(collaborators(&content));
  router.register_workflow(
    ProjectKind::from("ecommerce"),
    Box::new(ProvisioningWorkflow::new(collaborators(&shop))),
  );

  let project = router
    .create_project(ProjectConfig::new("Shop").with_kind("ecommerce"))
    .await
    .unwrap();

  assert_eq!(project.kind.as_str(), "ecommerce");
  assert!(content.journal.calls().is_empty());
  assert!(shop.journal.contains("schema.create_schema"));
}

#[tokio::test]
async fn test_register_extension_targets_kind_or_all() {
  let backend = MemoryBackend::new();
  let mut router = WorkflowRouter::new(collaborators(&backend));
  let shop = ProjectKind::from("ecommerce");
  router.register_workflow(
    shop.clone(),
    Box::new(ProvisioningWorkflow::new(collaborators(&backend))),
  );

  let everywhere: Arc<dyn Extension> = Arc::new(Marker("everywhere"));
  let shop_only: Arc<dyn Extension> = Arc::new(Marker("shop_only"));
  let nowhere: Arc<dyn Extension> = Arc::new(Marker("nowhere"));

  router.register_extension(everywhere.clone(), None);
  router.register_extension(shop_only.clone(), Some(shop.clone()));
  router.register_extension(nowhere, Some(ProjectKind::from("unknown")));

  let content_exts = router.workflow(&ProjectKind::Content).unwrap().extensions();
  assert_eq!(content_exts.len(), 1);
  assert!(Arc::ptr_eq(&content_exts[0], &everywhere));

  let shop_exts = router.workflow(&shop).unwrap().extensions();
  assert_eq!(shop_exts.len(), 2);
  assert!(Arc::ptr_eq(&shop_exts[0], &everywhere));
  assert!(Arc::ptr_eq(&shop_exts[1], &shop_only));
}

#[tokio::test]
async fn test_workflow_failure_surfaces_through_router() {
  let backend = MemoryBackend::new();
  backend.faults.set("schema.create_schema", Fault::Error);
  let router = WorkflowRouter::new(collaborators(&backend));

  let err = router
    .create_project(ProjectConfig::new("Garden Blog"))
    .await
    .unwrap_err();

  let RouterError::Workflow(inner) = err else {
    panic!("expected a workflow error");
  };
  assert_eq!(
    inner.state().unwrap().status(Phase::Database),
    PhaseStatus::Failed
  );
}

#[tokio::test]
async fn test_get_project_goes_through_content_workflow() {
  let backend = MemoryBackend::new();
  let router = WorkflowRouter::new(collaborators(&backend));

  let project = router
    .create_project(ProjectConfig::new("Garden Blog"))
    .await
    .unwrap();
  let id = project.state.id.clone().unwrap();

  let record = router.get_project(&id).await.unwrap().unwrap();
  assert_eq!(record.id, id);
  assert_eq!(record.schema_name, "proj_garden_blog");
}

#[tokio::test]
async fn test_provisioned_project_serializes_flat() {
  let backend = MemoryBackend::new();
  let mut router = WorkflowRouter::new(collaborators(&backend));
  router.register_extension(Arc::new(SeoExtension::new(backend.seo.clone())), None);

  let config = ProjectConfig::new("Garden Blog").with_settings(
    json!({"seo_enabled": true})
      .as_object()
      .cloned()
      .unwrap_or_default(),
  );
  let project = router.create_project(config).await.unwrap();
  assert_eq!(project.state.overall_status, Some(OverallStatus::Success));

  let value = serde_json::to_value(&project).unwrap();
  assert_eq!(value["type"], "content");
  assert_eq!(value["overall_status"], "success");
  assert_eq!(value["phase_status"]["extensions"], "completed");
  assert_eq!(value["extension_results"][0]["name"], "SeoExtension");
}
