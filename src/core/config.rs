use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder substituted with the computed version in templates
pub const VERSION_PLACEHOLDER: &str = "${version}";

/// The only glob character an asset path may use; `?` and `[` are literal
pub const ASSET_WILDCARD: char = '*';

/// Placeholder substituted with the generated release notes in templates
pub const NOTES_PLACEHOLDER: &str = "${notes}";

/// Configuration for releasekit
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// # Example
///
/// ```toml
/// tag_format = "v${version}"
///
/// [[branches]]
/// name = "main"
///
/// [[plugins]]
/// name = "commit-analyzer"
///
/// [[plugins]]
/// name = "exec"
/// options = { prepare_cmd = "make dist", timeout_secs = 300 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Git tag template, must contain `${version}` exactly once
  #[serde(default = "default_tag_format")]
  pub tag_format: String,

  /// Version used for the very first release (no matching tag yet)
  #[serde(default = "default_initial_version")]
  pub initial_version: String,

  /// Release channels, matched exactly against the current branch
  #[serde(default)]
  pub branches: Vec<BranchSpec>,

  /// Ordered stage-plugin bindings
  #[serde(default)]
  pub plugins: Vec<PluginBinding>,

  /// Version-string rewrite rules applied by the `manifest` plugin
  #[serde(default)]
  pub manifests: Vec<ManifestRule>,

  /// Release assets resolved by the `release-host` plugin
  #[serde(default)]
  pub assets: Vec<AssetSpec>,

  /// Commit-back settings used by the `git` plugin
  #[serde(default)]
  pub commit: CommitConfig,

  /// Release hosting settings used by the `release-host` plugin
  #[serde(default)]
  pub hosting: HostingConfig,
}

fn default_tag_format() -> String {
  format!("v{}", VERSION_PLACEHOLDER)
}

fn default_initial_version() -> String {
  "1.0.0".to_string()
}

/// A branch eligible to produce releases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSpec {
  /// Exact branch name
  pub name: String,

  /// Prerelease identifier (e.g. "beta"); releases from this branch get `-beta.N`
  #[serde(default)]
  pub prerelease: Option<String>,
}

impl BranchSpec {
  /// Create a stable release channel
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      prerelease: None,
    }
  }

  /// Create a prerelease channel
  pub fn prerelease(name: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      prerelease: Some(id.into()),
    }
  }
}

/// One `[[plugins]]` entry: plugin identity plus its option mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginBinding {
  pub name: String,
  #[serde(default)]
  pub options: BTreeMap<String, serde_json::Value>,
}

impl PluginBinding {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      options: BTreeMap::new(),
    }
  }

  /// Builder-style option setter
  pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.options.insert(key.into(), value);
    self
  }
}

/// Rewrite the first line matching `search` in every file matched by `files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRule {
  /// File path or glob, relative to the repository root
  pub files: String,
  /// Regex matched against individual lines
  pub search: String,
  /// Replacement template; `${version}` is substituted, capture refs stay live
  pub replace: String,
}

/// A release asset: literal path or single-wildcard glob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
  pub path: String,
  #[serde(default)]
  pub label: Option<String>,
}

impl AssetSpec {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      label: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
  /// Commit-back message; accepts `${version}` and `${notes}`
  #[serde(default = "default_commit_message")]
  pub message: String,
}

fn default_commit_message() -> String {
  format!("chore(release): {} [skip ci]", VERSION_PLACEHOLDER)
}

impl Default for CommitConfig {
  fn default() -> Self {
    Self {
      message: default_commit_message(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingConfig {
  /// Directory (relative to the repository root) holding published releases
  #[serde(default = "default_hosting_dir")]
  pub dir: PathBuf,
}

fn default_hosting_dir() -> PathBuf {
  PathBuf::from(".releases")
}

impl Default for HostingConfig {
  fn default() -> Self {
    Self {
      dir: default_hosting_dir(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load and validate a specific config file
  pub fn load_file(config_path: &Path) -> ReleaseResult<Self> {
    let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Parse {
      path: config_path.to_path_buf(),
      message: format!("could not read file: {}", e),
    })?;
    let config = Self::parse(&content).map_err(|e| match e {
      ReleaseError::Message { message, .. } => ReleaseError::Config(ConfigError::Parse {
        path: config_path.to_path_buf(),
        message,
      }),
      other => other,
    })?;
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Validate everything that does not need the plugin catalog
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.branches.is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "branches (at least one release branch)".to_string(),
      }));
    }

    let mut seen = HashSet::new();
    for branch in &self.branches {
      if branch.name.trim().is_empty() {
        return Err(invalid("branches.name", "branch name must not be empty"));
      }
      if !seen.insert(branch.name.as_str()) {
        return Err(invalid(
          "branches.name",
          format!("branch '{}' is configured twice", branch.name),
        ));
      }
      if let Some(id) = &branch.prerelease
        && (id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
      {
        return Err(invalid(
          "branches.prerelease",
          format!("'{}' is not a valid prerelease identifier", id),
        ));
      }
    }

    if self.tag_format.matches(VERSION_PLACEHOLDER).count() != 1 {
      return Err(invalid(
        "tag_format",
        format!("'{}' must contain {} exactly once", self.tag_format, VERSION_PLACEHOLDER),
      ));
    }

    self.initial_version()?;

    for rule in &self.manifests {
      if rule.files.trim().is_empty() {
        return Err(invalid("manifests.files", "file pattern must not be empty"));
      }
      regex::Regex::new(&rule.search)
        .map_err(|e| invalid("manifests.search", format!("'{}' is not a valid regex: {}", rule.search, e)))?;
    }

    for asset in &self.assets {
      if asset.path.trim().is_empty() {
        return Err(invalid("assets.path", "asset path must not be empty"));
      }
      if asset.path.matches(ASSET_WILDCARD).count() > 1 {
        return Err(invalid(
          "assets.path",
          format!("'{}' may contain at most one wildcard", asset.path),
        ));
      }
    }

    if self.commit.message.trim().is_empty() {
      return Err(invalid("commit.message", "message template must not be empty"));
    }

    Ok(())
  }

  /// Parsed initial version
  pub fn initial_version(&self) -> ReleaseResult<semver::Version> {
    semver::Version::parse(&self.initial_version).map_err(|e| {
      invalid(
        "initial_version",
        format!("'{}' is not valid semver: {}", self.initial_version, e),
      )
    })
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> ReleaseError {
  ReleaseError::Config(ConfigError::InvalidValue {
    field: field.to_string(),
    reason: reason.into(),
  })
}
