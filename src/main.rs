use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use plinth_config::{ProjectConfig, ProjectKind};
use plinth_engine::{
  ChannelNotifier, Collaborators, ProvisioningWorkflow, RouterError, WorkflowRouter,
};
use plinth_extension::SeoExtension;
use plinth_memory::MemoryBackend;

/// Plinth - provisions projects across their backing stores
#[derive(Parser)]
#[command(name = "plinth")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Provision a project against in-memory backends and print the report
  Provision {
    /// Path to the project config (JSON), or `-` to read stdin
    config_file: PathBuf,

    /// Provision as this project type. A workflow is registered for it, so
    /// only a type set in the config file alone can be unsupported.
    #[arg(long)]
    kind: Option<String>,

    /// Register the SEO extension
    #[arg(long)]
    seo: bool,

    /// Print provisioning events to stderr
    #[arg(long)]
    events: bool,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  match cli.command {
    Some(Commands::Provision {
      config_file,
      kind,
      seo,
      events,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(provision(config_file, kind, seo, events))?;
    }
    None => {
      println!("plinth - use --help to see available commands");
    }
  }

  Ok(())
}

async fn provision(
  config_file: PathBuf,
  kind: Option<String>,
  seo: bool,
  events: bool,
) -> Result<()> {
  let mut config = load_config(&config_file)?;
  let extra_kind = kind.map(ProjectKind::from).filter(|kind| !kind.is_content());
  if let Some(kind) = &extra_kind {
    config = config.with_kind(kind.clone());
  }
  info!(project = %config.name, kind = %config.kind(), "loaded project");

  let backend = MemoryBackend::new();
  let (tx, mut rx) = mpsc::unbounded_channel();
  let router = build_router(&backend, extra_kind, seo, ChannelNotifier::new(tx));

  let printer = tokio::spawn(async move {
    while let Some(event) = rx.recv().await {
      if events {
        eprintln!("event: {:?}", event);
      }
    }
  });

  let result = router.create_project(config).await;
  drop(router);
  printer.await.context("event printer failed")?;

  match result {
    Ok(project) => {
      println!("{}", serde_json::to_string_pretty(&project)?);
      Ok(())
    }
    Err(RouterError::Workflow(e)) => {
      if let Some(state) = e.state() {
        println!("{}", serde_json::to_string_pretty(state)?);
      }
      Err(e).context("provisioning failed")
    }
    Err(e) => Err(e.into()),
  }
}

/// Build a router over the in-memory backend. The content workflow is always
/// registered; `extra_kind` gets a workflow of its own.
fn build_router(
  backend: &MemoryBackend,
  extra_kind: Option<ProjectKind>,
  seo: bool,
  notifier: ChannelNotifier,
) -> WorkflowRouter {
  let services = Collaborators::new(
    backend.schema.clone(),
    backend.vector.clone(),
    backend.templates.clone(),
  );

  let mut router = WorkflowRouter::empty();
  router.register_workflow(
    ProjectKind::Content,
    Box::new(ProvisioningWorkflow::with_notifier(
      services.clone(),
      notifier.clone(),
    )),
  );
  if let Some(kind) = extra_kind {
    router.register_workflow(
      kind,
      Box::new(ProvisioningWorkflow::with_notifier(services, notifier)),
    );
  }

  if seo {
    router.register_extension(Arc::new(SeoExtension::new(backend.seo.clone())), None);
  }

  router
}

fn load_config(path: &Path) -> Result<ProjectConfig> {
  if path.as_os_str() == "-" {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read config from stdin")?;
    return ProjectConfig::from_json_str(&input).context("failed to parse config from stdin");
  }

  ProjectConfig::from_path(path)
    .with_context(|| format!("failed to load project config: {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_kind_override_is_provisioned() {
    let backend = MemoryBackend::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    let router = build_router(
      &backend,
      Some(ProjectKind::from("research")),
      true,
      ChannelNotifier::new(tx),
    );

    let kinds: Vec<&str> = router.kinds().iter().map(|k| k.as_str()).collect();
    assert_eq!(kinds, vec!["content", "research"]);

    let project = router
      .create_project(ProjectConfig::new("Atlas").with_kind("research"))
      .await
      .unwrap();
    assert_eq!(project.kind.as_str(), "research");
    assert_eq!(
      router
        .workflow(&ProjectKind::from("research"))
        .unwrap()
        .extensions()
        .len(),
      1
    );
  }

  #[tokio::test]
  async fn test_kind_only_in_config_is_unsupported() {
    let backend = MemoryBackend::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    let router = build_router(&backend, None, false, ChannelNotifier::new(tx));

    let err = router
      .create_project(ProjectConfig::new("Atlas").with_kind("research"))
      .await
      .unwrap_err();
    assert!(matches!(err, RouterError::UnsupportedKind(_)));
  }
}
