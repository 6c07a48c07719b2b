//! Release asset resolution with glob support
//!
//! A literal path that does not exist after the build is an error. A
//! wildcard pattern that matches nothing is only a warning; optional build
//! outputs are expressed that way.

use crate::core::config::{ASSET_WILDCARD, AssetSpec};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A configured asset and the concrete files it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
  pub pattern: String,
  pub label: Option<String>,
  /// Paths relative to the repository root, sorted
  pub resolved: Vec<PathBuf>,
}

impl AssetRef {
  pub fn resolved(pattern: &str, resolved: Vec<PathBuf>) -> Self {
    Self {
      pattern: pattern.to_string(),
      label: None,
      resolved,
    }
  }
}

/// Outcome of resolving one asset spec
#[derive(Debug)]
pub enum Resolution {
  Found(AssetRef),
  /// Wildcard matched nothing; carries the warning text
  Empty(String),
}

/// Whether an asset path should be expanded as a glob
pub fn is_wildcard(pattern: &str) -> bool {
  pattern.contains(ASSET_WILDCARD)
}

/// Resolve an asset spec against the repository root
pub fn resolve(root: &Path, spec: &AssetSpec) -> ReleaseResult<Resolution> {
  let pattern = spec.path.as_str();

  if !is_wildcard(pattern) {
    if !root.join(pattern).is_file() {
      return Err(ReleaseError::AssetNotFound {
        pattern: pattern.to_string(),
      });
    }
    return Ok(Resolution::Found(AssetRef {
      pattern: pattern.to_string(),
      label: spec.label.clone(),
      resolved: vec![PathBuf::from(pattern)],
    }));
  }

  let matches = expand(root, pattern)?;
  if matches.is_empty() {
    return Ok(Resolution::Empty(format!("Asset pattern '{}' matched no files", pattern)));
  }

  Ok(Resolution::Found(AssetRef {
    pattern: pattern.to_string(),
    label: spec.label.clone(),
    resolved: matches,
  }))
}

/// Expand a `*` pattern relative to `root` into sorted, root-relative file paths
///
/// Everything except the wildcard is matched literally.
pub fn expand(root: &Path, pattern: &str) -> ReleaseResult<Vec<PathBuf>> {
  let literal_parts: Vec<String> = pattern
    .trim_start_matches("./")
    .split(ASSET_WILDCARD)
    .map(glob::Pattern::escape)
    .collect();
  let full = format!(
    "{}/{}",
    glob::Pattern::escape(&root.to_string_lossy()),
    literal_parts.join("*")
  );

  let mut matches: Vec<PathBuf> = glob::glob(&full)
    .with_context(|| format!("While expanding '{}'", pattern))?
    .filter_map(|entry| entry.ok())
    .filter(|p| p.is_file())
    .filter_map(|p| p.strip_prefix(root).ok().map(Path::to_path_buf))
    .collect();
  matches.sort();
  Ok(matches)
}
