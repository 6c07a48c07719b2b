//! `release-notes`: render markdown notes for the next version

use super::{PluginSpec, bool_option, string_list_option};
use crate::core::config::PluginBinding;
use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::commits::CommitType;
use crate::release::notes::{DEFAULT_SECTIONS, ReleaseNotes};

pub const NAME: &str = "release-notes";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::GenerateNotes],
  options: &["include_hash", "sections"],
};

pub struct ReleaseNotesPlugin {
  include_hash: bool,
  sections: Vec<CommitType>,
}

impl ReleaseNotesPlugin {
  pub fn from_binding(binding: &PluginBinding) -> ReleaseResult<Self> {
    let include_hash = bool_option(binding, "include_hash", false)?;

    let sections = match string_list_option(binding, "sections")? {
      None => DEFAULT_SECTIONS.to_vec(),
      Some(keys) => keys
        .iter()
        .map(|key| {
          let commit_type = CommitType::parse(key);
          if commit_type.key() == key.to_lowercase() {
            Ok(commit_type)
          } else {
            Err(ReleaseError::from(ConfigError::InvalidValue {
              field: format!("plugins.{}.options.sections", NAME),
              reason: format!("unknown commit type '{}'", key),
            }))
          }
        })
        .collect::<ReleaseResult<Vec<_>>>()?,
    };

    Ok(Self { include_hash, sections })
  }
}

impl Plugin for ReleaseNotesPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn generate_notes(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let version = ctx
      .next_version()
      .ok_or_else(|| ReleaseError::message("Release notes need the next version to be known"))?
      .to_string();
    let date = ctx.timestamp().format("%Y-%m-%d").to_string();

    let mut notes = ReleaseNotes::new(version, date);
    for commit in ctx.commits() {
      notes.add_commit(commit);
    }

    let markdown = notes.to_markdown(&self.sections, self.include_hash);
    ctx.append_notes(&markdown);
    Ok(())
  }
}
