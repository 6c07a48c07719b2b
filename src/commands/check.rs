//! `releasekit check`: validate configuration without running anything

use crate::commands::load_config;
use crate::core::error::ReleaseResult;
use crate::pipeline::{StageRegistry, Step};
use serde::Serialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct CheckReport {
  config: PathBuf,
  tag_format: String,
  branches: Vec<BranchRow>,
  stages: Vec<StageRow>,
  manifests: usize,
  assets: usize,
}

#[derive(Debug, Serialize)]
struct BranchRow {
  name: String,
  channel: Option<String>,
}

#[derive(Debug, Serialize)]
struct StageRow {
  step: Step,
  plugin: String,
}

/// Run the check command
pub fn run_check(config: Option<PathBuf>, json: bool) -> ReleaseResult<()> {
  let root = env::current_dir()?;
  let (config_path, config) = load_config(&root, config.as_deref())?;
  let registry = StageRegistry::from_config(&config)?;

  let report = CheckReport {
    config: config_path,
    tag_format: config.tag_format.clone(),
    branches: config
      .branches
      .iter()
      .map(|b| BranchRow {
        name: b.name.clone(),
        channel: b.prerelease.clone(),
      })
      .collect(),
    stages: registry
      .stages()
      .into_iter()
      .map(|(step, plugin)| StageRow { step, plugin })
      .collect(),
    manifests: config.manifests.len(),
    assets: config.assets.len(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("✅ Configuration is valid: {}", report.config.display());
  println!();
  println!("Branches:");
  for branch in &report.branches {
    match &branch.channel {
      Some(channel) => println!("  🌿 {} (prerelease: {})", branch.name, channel),
      None => println!("  🌿 {}", branch.name),
    }
  }
  println!();
  println!("Stages:");
  for step in Step::ALL {
    let plugins: Vec<_> = report
      .stages
      .iter()
      .filter(|row| row.step == step)
      .map(|row| row.plugin.as_str())
      .collect();
    if plugins.is_empty() {
      println!("  {:<16} -", step.as_str());
    } else {
      println!("  {:<16} {}", step.as_str(), plugins.join(", "));
    }
  }
  println!();
  println!(
    "Tag format: {}  |  {} manifest rule(s)  |  {} asset(s)",
    report.tag_format, report.manifests, report.assets
  );

  Ok(())
}
