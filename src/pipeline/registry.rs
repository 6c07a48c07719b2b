//! Stage registry: which plugins run for which step
//!
//! Plugins are kept in registration order. For a given step the registry
//! yields every plugin that declared it, in that order.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ConfigError, ReleaseResult};
use crate::pipeline::plugin::Plugin;
use crate::pipeline::plugins::{self, host, manifest};
use crate::pipeline::step::Step;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct StageRegistry {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl StageRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build and validate the registry described by a configuration
  pub fn from_config(config: &ReleaseConfig) -> ReleaseResult<Self> {
    let mut registry = Self::new();
    for binding in &config.plugins {
      registry.register(plugins::instantiate(binding, config)?);
    }

    if !config.manifests.is_empty() && !registry.contains(manifest::NAME) {
      return Err(
        ConfigError::InvalidValue {
          field: "manifests".to_string(),
          reason: format!("rules are configured but the '{}' plugin is not", manifest::NAME),
        }
        .into(),
      );
    }
    if !config.assets.is_empty() && !registry.contains(host::NAME) {
      return Err(
        ConfigError::InvalidValue {
          field: "assets".to_string(),
          reason: format!("assets are configured but the '{}' plugin is not", host::NAME),
        }
        .into(),
      );
    }

    registry.validate()?;
    Ok(registry)
  }

  /// Append a plugin after those already registered
  pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
    self.plugins.push(plugin);
    self
  }

  /// Every step must be satisfiable; analyze-commits is mandatory
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.plugins_for(Step::AnalyzeCommits).next().is_none() {
      return Err(
        ConfigError::MissingStep {
          step: Step::AnalyzeCommits.to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  /// Plugins implementing `step`, in registration order
  pub fn plugins_for(&self, step: Step) -> impl Iterator<Item = &Arc<dyn Plugin>> {
    self.plugins.iter().filter(move |p| p.steps().contains(&step))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.plugins.iter().any(|p| p.name() == name)
  }

  /// (step, plugin name) pairs in execution order
  pub fn stages(&self) -> Vec<(Step, String)> {
    Step::ALL
      .iter()
      .flat_map(|step| self.plugins_for(*step).map(move |p| (*step, p.name().to_string())))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.plugins.len()
  }

  pub fn is_empty(&self) -> bool {
    self.plugins.is_empty()
  }
}
