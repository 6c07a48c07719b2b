//! CLI commands for releasekit
//!
//! - **run**: execute the release pipeline (or a dry run via `plan`)
//! - **check**: validate configuration and show which plugin runs at each step
//! - **init**: write a starter release.toml

pub mod check;
pub mod init;
pub mod run;

pub use check::run_check;
pub use init::run_init;
pub use run::{RunOptions, run_release};

use crate::core::config::ReleaseConfig;
use crate::core::error::{ConfigError, ReleaseResult};
use std::path::{Path, PathBuf};

/// Resolve and load the configuration, honouring an explicit `--config` path
pub(crate) fn load_config(root: &Path, explicit: Option<&Path>) -> ReleaseResult<(PathBuf, ReleaseConfig)> {
  let path = match explicit {
    Some(path) => {
      let path = root.join(path);
      if !path.is_file() {
        return Err(ConfigError::NotFound { root: path }.into());
      }
      path
    }
    None => ReleaseConfig::find_config_path(root).ok_or_else(|| ConfigError::NotFound {
      root: root.to_path_buf(),
    })?,
  };

  let config = ReleaseConfig::load_file(&path)?;
  Ok((path, config))
}
