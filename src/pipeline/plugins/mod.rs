//! Built-in plugin catalog
//!
//! | name              | step            | options                         |
//! |-------------------|-----------------|---------------------------------|
//! | `commit-analyzer` | analyze-commits | `release_rules`                 |
//! | `release-notes`   | generate-notes  | `include_hash`, `sections`      |
//! | `changelog`       | update-files    | `file`, `title`                 |
//! | `manifest`        | update-files    | (uses `[[manifests]]`)          |
//! | `exec`            | prepare         | `prepare_cmd`, `timeout_secs`   |
//! | `release-host`    | publish         | (uses `[[assets]]`)             |
//! | `git`             | commit-back     | (uses `[commit]`)               |

pub mod analyzer;
pub mod changelog;
pub mod exec;
pub mod git;
pub mod host;
pub mod manifest;
pub mod notes;

use crate::core::config::{PluginBinding, ReleaseConfig};
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::pipeline::plugin::Plugin;
use crate::pipeline::step::Step;
use serde_json::Value;
use std::sync::Arc;

/// Catalog entry: a plugin identity, its steps and accepted options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSpec {
  pub name: &'static str,
  pub steps: &'static [Step],
  pub options: &'static [&'static str],
}

pub const CATALOG: [PluginSpec; 7] = [
  analyzer::SPEC,
  notes::SPEC,
  changelog::SPEC,
  manifest::SPEC,
  exec::SPEC,
  host::SPEC,
  git::SPEC,
];

/// Look up a catalog entry by name
pub fn spec(name: &str) -> Option<&'static PluginSpec> {
  CATALOG.iter().find(|spec| spec.name == name)
}

/// Build the plugin a binding names, validating its options
pub fn instantiate(binding: &PluginBinding, config: &ReleaseConfig) -> ReleaseResult<Arc<dyn Plugin>> {
  let spec = spec(&binding.name).ok_or_else(|| ConfigError::UnknownPlugin {
    name: binding.name.clone(),
  })?;

  if let Some(option) = binding.options.keys().find(|key| !spec.options.contains(&key.as_str())) {
    return Err(
      ConfigError::UnknownOption {
        plugin: binding.name.clone(),
        option: option.clone(),
      }
      .into(),
    );
  }

  let plugin: Arc<dyn Plugin> = match spec.name {
    analyzer::NAME => Arc::new(analyzer::CommitAnalyzer::from_binding(binding)?),
    notes::NAME => Arc::new(notes::ReleaseNotesPlugin::from_binding(binding)?),
    changelog::NAME => Arc::new(changelog::ChangelogPlugin::from_binding(binding)?),
    manifest::NAME => Arc::new(manifest::ManifestPlugin::new(config.manifests.clone())),
    exec::NAME => Arc::new(exec::ExecPlugin::from_binding(binding)?),
    host::NAME => Arc::new(host::ReleaseHostPlugin::new(config.assets.clone())),
    git::NAME => Arc::new(git::GitPlugin::new(config.commit.message.clone())),
    other => {
      return Err(
        ConfigError::UnknownPlugin {
          name: other.to_string(),
        }
        .into(),
      );
    }
  };

  Ok(plugin)
}

fn invalid(binding: &PluginBinding, key: &str, reason: impl Into<String>) -> ConfigError {
  ConfigError::InvalidValue {
    field: format!("plugins.{}.options.{}", binding.name, key),
    reason: reason.into(),
  }
}

/// Optional string option
pub(crate) fn string_option(binding: &PluginBinding, key: &str) -> ReleaseResult<Option<String>> {
  match binding.options.get(key) {
    None => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.clone())),
    Some(other) => Err(invalid(binding, key, format!("expected a string, found {}", other)).into()),
  }
}

/// Optional boolean option with a default
pub(crate) fn bool_option(binding: &PluginBinding, key: &str, default: bool) -> ReleaseResult<bool> {
  match binding.options.get(key) {
    None => Ok(default),
    Some(Value::Bool(b)) => Ok(*b),
    Some(other) => Err(invalid(binding, key, format!("expected true or false, found {}", other)).into()),
  }
}

/// Optional positive integer option with a default
pub(crate) fn u64_option(binding: &PluginBinding, key: &str, default: u64) -> ReleaseResult<u64> {
  match binding.options.get(key) {
    None => Ok(default),
    Some(value) => match value.as_u64() {
      Some(n) if n > 0 => Ok(n),
      _ => Err(invalid(binding, key, format!("expected a positive integer, found {}", value)).into()),
    },
  }
}

/// Optional table-of-strings option
pub(crate) fn string_map_option(binding: &PluginBinding, key: &str) -> ReleaseResult<Vec<(String, String)>> {
  match binding.options.get(key) {
    None => Ok(Vec::new()),
    Some(Value::Object(map)) => map
      .iter()
      .map(|(k, v)| match v {
        Value::String(s) => Ok((k.clone(), s.clone())),
        other => Err(ReleaseError::from(invalid(
          binding,
          key,
          format!("value for '{}' must be a string, found {}", k, other),
        ))),
      })
      .collect(),
    Some(other) => Err(invalid(binding, key, format!("expected a table, found {}", other)).into()),
  }
}

/// Optional list-of-strings option
pub(crate) fn string_list_option(binding: &PluginBinding, key: &str) -> ReleaseResult<Option<Vec<String>>> {
  match binding.options.get(key) {
    None => Ok(None),
    Some(Value::Array(items)) => items
      .iter()
      .map(|item| match item {
        Value::String(s) => Ok(s.clone()),
        other => Err(ReleaseError::from(invalid(binding, key, format!("expected strings, found {}", other)))),
      })
      .collect::<ReleaseResult<Vec<_>>>()
      .map(Some),
    Some(other) => Err(invalid(binding, key, format!("expected a list, found {}", other)).into()),
  }
}
