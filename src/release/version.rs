//! Release types, version bumps and tag formatting

use crate::core::config::VERSION_PLACEHOLDER;
use crate::core::error::{ContextError, ReleaseResult};
use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version bump type decided by commit analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
  /// No bump needed (no relevant changes)
  None,
  /// Patch version bump (bug fixes)
  Patch,
  /// Minor version bump (new features)
  Minor,
  /// Major version bump (breaking changes)
  Major,
}

impl ReleaseType {
  /// Apply bump to a semver version
  ///
  /// Prerelease and build metadata are dropped; a bump always lands on a
  /// plain `major.minor.patch`.
  pub fn apply(&self, version: &Version) -> Version {
    match self {
      ReleaseType::Major => Version::new(version.major + 1, 0, 0),
      ReleaseType::Minor => Version::new(version.major, version.minor + 1, 0),
      ReleaseType::Patch => Version::new(version.major, version.minor, version.patch + 1),
      ReleaseType::None => version.clone(),
    }
  }

  /// Parse a release type name as used in `release_rules`
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "major" => Some(ReleaseType::Major),
      "minor" => Some(ReleaseType::Minor),
      "patch" => Some(ReleaseType::Patch),
      "none" | "false" => Some(ReleaseType::None),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ReleaseType::Major => "major",
      ReleaseType::Minor => "minor",
      ReleaseType::Patch => "patch",
      ReleaseType::None => "none",
    }
  }
}

impl fmt::Display for ReleaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Compute the version a release of `release_type` produces
///
/// - No previous release: `initial` (with the prerelease suffix on a prerelease channel).
/// - Stable channel: `release_type.apply(last)`.
/// - Prerelease channel `id`: the higher of `X.Y.Z-id.N+1` (when `last` is
///   already `X.Y.Z-id.N`) and `release_type.apply(last_stable)-id.1`, so a
///   breaking change on a channel that is only cutting patch prereleases
///   still moves the base version.
///
/// `last_stable` is the highest stable release; without one the bump is
/// taken from `last`.
///
/// Returns `None` for `ReleaseType::None`.
pub fn next_version(
  last: Option<&Version>,
  last_stable: Option<&Version>,
  release_type: ReleaseType,
  prerelease: Option<&str>,
  initial: &Version,
) -> Option<Version> {
  if release_type == ReleaseType::None {
    return None;
  }

  let Some(last) = last else {
    let mut first = Version::new(initial.major, initial.minor, initial.patch);
    if let Some(id) = prerelease {
      first.pre = prerelease_tag(id, 1);
    }
    return Some(first);
  };

  let Some(id) = prerelease else {
    return Some(release_type.apply(last));
  };

  let counted = prerelease_counter(last, id).map(|counter| {
    let mut next = Version::new(last.major, last.minor, last.patch);
    next.pre = prerelease_tag(id, counter + 1);
    next
  });

  let bumped = match (last_stable, &counted) {
    // Nothing stable to bump from: keep counting on the current base
    (None, Some(_)) => None,
    (Some(stable), _) => Some(release_type.apply(stable)),
    (None, None) => Some(release_type.apply(last)),
  }
  .map(|mut next| {
    next.pre = prerelease_tag(id, 1);
    next
  });

  match (counted, bumped) {
    (Some(counted), Some(bumped)) => Some(counted.max(bumped)),
    (counted, bumped) => counted.or(bumped),
  }
}

/// Fail unless `next` moves strictly past `last`
pub fn ensure_monotonic(last: Option<&Version>, next: &Version) -> ReleaseResult<()> {
  match last {
    Some(last) if next <= last => Err(
      ContextError::NonMonotonic {
        last: last.to_string(),
        next: next.to_string(),
      }
      .into(),
    ),
    _ => Ok(()),
  }
}

/// `N` when `version` carries the prerelease `id.N`
fn prerelease_counter(version: &Version, id: &str) -> Option<u64> {
  let (pre_id, counter) = version.pre.as_str().rsplit_once('.')?;
  if pre_id != id {
    return None;
  }
  counter.parse().ok()
}

fn prerelease_tag(id: &str, counter: u64) -> Prerelease {
  Prerelease::new(&format!("{}.{}", id, counter)).unwrap_or(Prerelease::EMPTY)
}

/// Tag template such as `v${version}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
  prefix: String,
  suffix: String,
}

impl TagFormat {
  /// Split a template around its single `${version}` placeholder
  pub fn new(template: &str) -> Option<Self> {
    let (prefix, suffix) = template.split_once(VERSION_PLACEHOLDER)?;
    if suffix.contains(VERSION_PLACEHOLDER) {
      return None;
    }
    Some(Self {
      prefix: prefix.to_string(),
      suffix: suffix.to_string(),
    })
  }

  /// Render the tag for a version
  pub fn format(&self, version: &Version) -> String {
    format!("{}{}{}", self.prefix, version, self.suffix)
  }

  /// Extract the version from a tag produced by this format
  pub fn parse(&self, tag: &str) -> Option<Version> {
    let inner = tag.strip_prefix(&self.prefix)?.strip_suffix(&self.suffix)?;
    Version::parse(inner).ok()
  }
}

impl Default for TagFormat {
  fn default() -> Self {
    Self {
      prefix: "v".to_string(),
      suffix: String::new(),
    }
  }
}
