//! Error types for releasekit with contextual messages and exit codes
//!
//! Every failure in a release run maps onto one of the categories below.
//! Configuration problems are reported before any run starts and exit with
//! code 1; everything that goes wrong while the pipeline is executing exits
//! with code 2.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Exit codes for releasekit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Configuration error (malformed bindings, missing options, bad rules)
  Config = 1,
  /// Pipeline execution error (analysis, rewrite, build, publish, git)
  Pipeline = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for releasekit
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors (fatal before any run starts)
  Config(ConfigError),

  /// Commit history could not be read from version control
  Analysis { message: String },

  /// A configured manifest rewrite did nothing or could not be applied
  ManifestRewrite(ManifestRewriteError),

  /// A required (non-wildcard) asset is missing after the build
  AssetNotFound { pattern: String },

  /// The external prepare command failed or timed out
  Prepare(PrepareError),

  /// The release host refused or failed the publish call
  Publish(PublishError),

  /// Another run already holds the release lock for this branch
  ConcurrentRelease { branch: String },

  /// A plugin violated a context store invariant
  Context(ContextError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Create an analysis error (version control unreachable or unreadable)
  pub fn analysis(msg: impl Into<String>) -> Self {
    ReleaseError::Analysis { message: msg.into() }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::Config,
      _ => ExitCode::Pipeline,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::ManifestRewrite(e) => e.help_message(),
      ReleaseError::Prepare(e) => e.help_message(),
      ReleaseError::Publish(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::AssetNotFound { .. } => {
        Some("Check that the prepare command produces this file, or use a wildcard if it is optional.".to_string())
      }
      ReleaseError::ConcurrentRelease { .. } => Some(
        "Wait for the in-flight release to finish. A stale lock file can be removed from the git directory."
          .to_string(),
      ),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Analysis { message } => write!(f, "Commit analysis failed: {}", message),
      ReleaseError::ManifestRewrite(e) => write!(f, "{}", e),
      ReleaseError::AssetNotFound { pattern } => write!(f, "Required asset not found: {}", pattern),
      ReleaseError::Prepare(e) => write!(f, "{}", e),
      ReleaseError::Publish(e) => write!(f, "{}", e),
      ReleaseError::ConcurrentRelease { branch } => {
        write!(f, "A release for branch '{}' is already in progress", branch)
      }
      ReleaseError::Context(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ManifestRewriteError> for ReleaseError {
  fn from(err: ManifestRewriteError) -> Self {
    ReleaseError::ManifestRewrite(err)
  }
}

impl From<PrepareError> for ReleaseError {
  fn from(err: PrepareError) -> Self {
    ReleaseError::Prepare(err)
  }
}

impl From<PublishError> for ReleaseError {
  fn from(err: PublishError) -> Self {
    ReleaseError::Publish(err)
  }
}

impl From<ContextError> for ReleaseError {
  fn from(err: ContextError) -> Self {
    ReleaseError::Context(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Invalid regex: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<semver::Error> for ReleaseError {
  fn from(err: semver::Error) -> Self {
    ReleaseError::message(format!("Invalid version: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ReleaseError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ReleaseError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// release.toml not found
  NotFound { root: PathBuf },

  /// Config file exists but could not be parsed
  Parse { path: PathBuf, message: String },

  /// Missing required field or plugin option
  MissingField { field: String },

  /// A field or option holds a value of the wrong shape
  InvalidValue { field: String, reason: String },

  /// Plugin name not present in the built-in catalog
  UnknownPlugin { name: String },

  /// Option not understood by the plugin it was given to
  UnknownOption { plugin: String, option: String },

  /// No configured plugin implements a step the pipeline requires
  MissingStep { step: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `releasekit init` to create a configuration file.".to_string()),
      ConfigError::UnknownPlugin { .. } => Some(
        "Built-in plugins: commit-analyzer, release-notes, changelog, manifest, exec, release-host, git".to_string(),
      ),
      ConfigError::MissingStep { .. } => {
        Some("Add a [[plugins]] entry such as `name = \"commit-analyzer\"` to release.toml.".to_string())
      }
      ConfigError::UnknownOption { plugin, .. } => Some(format!(
        "Run `releasekit check` to list the options accepted by '{}'.",
        plugin
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { root } => {
        write!(
          f,
          "No releasekit configuration found.\nExpected file: {}/release.toml",
          root.display()
        )
      }
      ConfigError::Parse { path, message } => {
        write!(f, "Failed to parse config from {}: {}", path.display(), message)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
      ConfigError::UnknownPlugin { name } => {
        write!(f, "Unknown plugin '{}'", name)
      }
      ConfigError::UnknownOption { plugin, option } => {
        write!(f, "Plugin '{}' does not accept option '{}'", plugin, option)
      }
      ConfigError::MissingStep { step } => {
        write!(f, "No configured plugin implements the '{}' step", step)
      }
    }
  }
}

/// Errors raised by the manifest rewriter
#[derive(Debug)]
pub enum ManifestRewriteError {
  /// The file glob matched no existing file
  FileNotFound { pattern: String },

  /// The search pattern matched zero lines in a file
  NoMatch { file: PathBuf, search: String },
}

impl ManifestRewriteError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestRewriteError::FileNotFound { .. } => {
        Some("Fix the `files` entry of the [[manifests]] rule or remove the rule.".to_string())
      }
      ManifestRewriteError::NoMatch { .. } => {
        Some("The `search` regex is matched line by line; anchor it to a single line.".to_string())
      }
    }
  }
}

impl fmt::Display for ManifestRewriteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestRewriteError::FileNotFound { pattern } => {
        write!(f, "Manifest rewrite failed: no file matches '{}'", pattern)
      }
      ManifestRewriteError::NoMatch { file, search } => {
        write!(
          f,
          "Manifest rewrite failed: pattern '{}' matched no line in {}",
          search,
          file.display()
        )
      }
    }
  }
}

/// Errors raised by the external prepare command
#[derive(Debug)]
pub enum PrepareError {
  /// The command could not be started
  Spawn { command: String, reason: String },

  /// The command exited with a nonzero status
  Failed {
    command: String,
    status: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// The command ran past its timeout and was killed
  TimedOut {
    command: String,
    timeout: Duration,
    /// Output captured before the kill
    stdout: String,
    stderr: String,
  },
}

impl PrepareError {
  fn help_message(&self) -> Option<String> {
    match self {
      PrepareError::TimedOut { .. } => Some("Raise `timeout_secs` on the exec plugin if the build is slow.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for PrepareError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PrepareError::Spawn { command, reason } => {
        write!(f, "Failed to start prepare command `{}`: {}", command, reason)
      }
      PrepareError::Failed {
        command,
        status,
        stdout,
        stderr,
      } => {
        let code = status.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
        write!(f, "Prepare command `{}` failed (exit {})", command, code)?;
        write_output(f, stdout, stderr)
      }
      PrepareError::TimedOut {
        command,
        timeout,
        stdout,
        stderr,
      } => {
        write!(f, "Prepare command `{}` timed out after {}s", command, timeout.as_secs())?;
        write_output(f, stdout, stderr)
      }
    }
  }
}

fn write_output(f: &mut fmt::Formatter<'_>, stdout: &str, stderr: &str) -> fmt::Result {
  if !stdout.trim().is_empty() {
    write!(f, "\n--- stdout ---\n{}", stdout.trim_end())?;
  }
  if !stderr.trim().is_empty() {
    write!(f, "\n--- stderr ---\n{}", stderr.trim_end())?;
  }
  Ok(())
}

/// Errors raised by the release host
#[derive(Debug)]
pub enum PublishError {
  /// A release with this tag already exists
  Duplicate { tag: String },

  /// Any other hosting failure
  Failed { tag: String, reason: String },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::Duplicate { .. } => Some(
        "The tag was already published. Delete the existing release or push a new commit before re-running."
          .to_string(),
      ),
      PublishError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::Duplicate { tag } => write!(f, "Release {} already exists", tag),
      PublishError::Failed { tag, reason } => write!(f, "Failed to publish {}: {}", tag, reason),
    }
  }
}

/// Context store invariant violations
#[derive(Debug)]
pub enum ContextError {
  /// A write-once field was written a second time
  AlreadySet { field: &'static str },

  /// The next version does not move past the last released version
  NonMonotonic { last: String, next: String },
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ContextError::AlreadySet { field } => {
        write!(f, "Release context field '{}' was already set in this run", field)
      }
      ContextError::NonMonotonic { last, next } => {
        write!(f, "Next version {} is not greater than last version {}", next, last)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Result type alias for releasekit
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
