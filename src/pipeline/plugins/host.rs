//! `release-host`: resolve assets and publish the tagged release

use super::PluginSpec;
use crate::core::config::AssetSpec;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::assets::{self, Resolution};

pub const NAME: &str = "release-host";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::Publish],
  options: &[],
};

pub struct ReleaseHostPlugin {
  assets: Vec<AssetSpec>,
}

impl ReleaseHostPlugin {
  pub fn new(assets: Vec<AssetSpec>) -> Self {
    Self { assets }
  }
}

impl Plugin for ReleaseHostPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn publish(&self, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let tag = ctx
      .tag()
      .ok_or_else(|| ReleaseError::message("Publishing needs the release tag to be known"))?
      .to_string();

    // Resolved after prepare so build outputs are visible
    for spec in &self.assets {
      match assets::resolve(env.root, spec)? {
        Resolution::Found(asset) => ctx.push_asset(asset),
        Resolution::Empty(warning) => {
          tracing::warn!("{}", warning);
          ctx.warn(warning);
        }
      }
    }

    let files: Vec<_> = ctx.resolved_assets().iter().map(|p| env.root.join(p)).collect();
    let notes = ctx.notes().unwrap_or_default().to_string();

    let handle = env.host.publish(&tag, &notes, &files)?;
    tracing::info!(%tag, location = %handle.location, assets = handle.assets.len(), "release published");
    ctx.push_release(handle);
    Ok(())
  }
}
