use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator selecting which workflow provisions a project.
///
/// Serialized as a plain string. `"content"` always maps to
/// [`ProjectKind::Content`], the canonical kind every router serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectKind {
  #[default]
  Content,
  Named(String),
}

impl ProjectKind {
  pub const CONTENT: &'static str = "content";

  pub fn as_str(&self) -> &str {
    match self {
      ProjectKind::Content => Self::CONTENT,
      ProjectKind::Named(name) => name,
    }
  }

  pub fn is_content(&self) -> bool {
    matches!(self, ProjectKind::Content)
  }
}

impl From<&str> for ProjectKind {
  fn from(value: &str) -> Self {
    if value == Self::CONTENT {
      ProjectKind::Content
    } else {
      ProjectKind::Named(value.to_string())
    }
  }
}

impl From<String> for ProjectKind {
  fn from(value: String) -> Self {
    if value == Self::CONTENT {
      ProjectKind::Content
    } else {
      ProjectKind::Named(value)
    }
  }
}

impl From<ProjectKind> for String {
  fn from(kind: ProjectKind) -> Self {
    match kind {
      ProjectKind::Content => ProjectKind::CONTENT.to_string(),
      ProjectKind::Named(name) => name,
    }
  }
}

impl fmt::Display for ProjectKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_content_string_is_canonical() {
    assert_eq!(ProjectKind::from("content"), ProjectKind::Content);
    assert_eq!(
      ProjectKind::from("research".to_string()),
      ProjectKind::Named("research".to_string())
    );
  }

  #[test]
  fn test_serializes_as_plain_string() {
    let json = serde_json::to_string(&ProjectKind::Named("docs".to_string())).unwrap();
    assert_eq!(json, "\"docs\"");

    let kind: ProjectKind = serde_json::from_str("\"content\"").unwrap();
    assert!(kind.is_content());
  }
}
