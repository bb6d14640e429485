//! Project profile documents.
//!
//! The vector store phase embeds one descriptive document per project. The
//! document concatenates the project name, every description entry and every
//! setting, one per line:
//!
//! ```text
//! Project: Garden Blog
//! audience: hobby gardeners
//! Settings:
//!   language: en
//! ```

use minijinja::{Environment, context};
use plinth_config::{Fields, ProjectConfig};
use plinth_services::{ProfileDocument, ProjectId};
use serde::Serialize;
use serde_json::Value;

const PROFILE_TEMPLATE: &str = "Project: {{ name }}\n\
{% for line in description %}{{ line.key }}: {{ line.value }}\n{% endfor %}\
{% if settings %}Settings:\n\
{% for line in settings %}  {{ line.key }}: {{ line.value }}\n{% endfor %}\
{% endif %}";

#[derive(Serialize)]
struct Line {
  key: String,
  value: String,
}

fn lines(fields: &Fields) -> Vec<Line> {
  fields
    .iter()
    .map(|(key, value)| Line {
      key: key.clone(),
      value: match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      },
    })
    .collect()
}

/// Build the profile document for a project.
pub fn render_profile(
  id: &ProjectId,
  config: &ProjectConfig,
) -> Result<ProfileDocument, minijinja::Error> {
  let env = Environment::new();
  let text = env.render_str(
    PROFILE_TEMPLATE,
    context! {
      name => &config.name,
      description => lines(&config.description),
      settings => lines(&config.settings),
    },
  )?;

  let mut metadata = Fields::new();
  metadata.insert("project_id".to_string(), Value::from(id.as_str()));
  metadata.insert("type".to_string(), Value::from("project_profile"));
  metadata.insert("name".to_string(), Value::from(config.name.as_str()));

  Ok(ProfileDocument {
    vector_id: format!("project_profile_{}", id),
    text,
    metadata,
  })
}
