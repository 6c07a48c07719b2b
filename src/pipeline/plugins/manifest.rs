//! `manifest`: apply the configured `[[manifests]]` rewrite rules

use super::PluginSpec;
use crate::core::config::ManifestRule;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::manifest::apply_rule;

pub const NAME: &str = "manifest";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::UpdateFiles],
  options: &[],
};

pub struct ManifestPlugin {
  rules: Vec<ManifestRule>,
}

impl ManifestPlugin {
  pub fn new(rules: Vec<ManifestRule>) -> Self {
    Self { rules }
  }
}

impl Plugin for ManifestPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn update_files(&self, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let version = ctx
      .next_version()
      .ok_or_else(|| ReleaseError::message("Manifest rewrites need the next version to be known"))?
      .to_string();

    for rule in &self.rules {
      for file in apply_rule(env.root, rule, &version)? {
        tracing::info!(file = %file.display(), "manifest rewritten");
        ctx.record_changed_file(file);
      }
    }

    Ok(())
  }
}
