use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read project config '{}'", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid project config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("project name must not be empty")]
  EmptyName,
}
