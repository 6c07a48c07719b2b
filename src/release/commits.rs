//! Commit records and conventional-commit classification
//!
//! Only the header convention `<type>(<scope>)!: <description>` plus the
//! `BREAKING CHANGE:` footer is understood. Anything else is kept as an
//! unclassified commit; it still appears in the history, it just never
//! drives a version bump on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional commit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
  /// New feature
  Feat,
  /// Bug fix
  Fix,
  /// Performance improvements
  Perf,
  /// Reverts a previous commit
  Revert,
  /// Documentation changes
  Docs,
  /// Code style changes (formatting, etc.)
  Style,
  /// Refactoring (no functional changes)
  Refactor,
  /// Test additions or changes
  Test,
  /// Build system or external dependency changes
  Build,
  /// CI configuration changes
  Ci,
  /// Chores (maintenance tasks)
  Chore,
  /// Any other well-formed type
  Other,
}

impl CommitType {
  /// Parse commit type from string
  pub fn parse(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "perf" | "performance" => Self::Perf,
      "revert" => Self::Revert,
      "docs" | "doc" => Self::Docs,
      "style" => Self::Style,
      "refactor" => Self::Refactor,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      _ => Self::Other,
    }
  }

  /// Lowercase key used in configuration (`release_rules`)
  pub fn key(&self) -> &'static str {
    match self {
      Self::Feat => "feat",
      Self::Fix => "fix",
      Self::Perf => "perf",
      Self::Revert => "revert",
      Self::Docs => "docs",
      Self::Style => "style",
      Self::Refactor => "refactor",
      Self::Test => "test",
      Self::Build => "build",
      Self::Ci => "ci",
      Self::Chore => "chore",
      Self::Other => "other",
    }
  }

  /// Get the display name for this commit type
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Feat => "Features",
      Self::Fix => "Bug Fixes",
      Self::Perf => "Performance",
      Self::Revert => "Reverts",
      Self::Docs => "Documentation",
      Self::Style => "Style",
      Self::Refactor => "Refactoring",
      Self::Test => "Tests",
      Self::Build => "Build",
      Self::Ci => "CI",
      Self::Chore => "Chores",
      Self::Other => "Other",
    }
  }
}

impl fmt::Display for CommitType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

/// A commit read from version control. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
  pub hash: String,
  pub raw_message: String,
  /// `None` when the header does not follow the convention
  pub parsed_type: Option<CommitType>,
  pub scope: Option<String>,
  /// Header description (or the raw subject for unclassified commits)
  pub description: String,
  pub breaking: bool,
  /// Text of the `BREAKING CHANGE:` footer, if present and non-empty
  pub breaking_note: Option<String>,
}

impl CommitRecord {
  /// Classify a raw commit message
  pub fn from_message(hash: impl Into<String>, message: &str) -> Self {
    let hash = hash.into();
    match parse_conventional(message) {
      Some(parsed) => Self {
        hash,
        raw_message: message.to_string(),
        parsed_type: Some(parsed.commit_type),
        scope: parsed.scope,
        description: parsed.description,
        breaking: parsed.breaking,
        breaking_note: parsed.breaking_note.filter(|n| !n.is_empty()),
      },
      None => Self {
        hash,
        raw_message: message.to_string(),
        parsed_type: None,
        scope: None,
        description: message.lines().next().unwrap_or("").trim().to_string(),
        breaking: false,
        breaking_note: None,
      },
    }
  }

  /// Abbreviated hash for display
  pub fn short_hash(&self) -> &str {
    self.hash.get(..7).unwrap_or(&self.hash)
  }
}

struct ParsedHeader {
  commit_type: CommitType,
  scope: Option<String>,
  description: String,
  breaking: bool,
  breaking_note: Option<String>,
}

fn parse_conventional(message: &str) -> Option<ParsedHeader> {
  use winnow::ascii::{alphanumeric1, space0};
  use winnow::combinator::{opt, preceded, terminated};
  use winnow::prelude::*;
  use winnow::token::take_till;

  let (first_line, rest) = message.split_once('\n').unwrap_or((message, ""));

  // type(scope)!: description
  let mut parser = (
    alphanumeric1::<_, ()>.map(CommitType::parse),
    opt(preceded('(', terminated(take_till(1.., ')'), ')'))),
    opt('!'),
    ':',
    space0,
    take_till(0.., ['\n', '\r']),
  );

  let Ok((commit_type, scope, bang, _, _, description)) = parser.parse(first_line.trim_end()) else {
    return None;
  };

  let mut breaking_note = None;
  for line in rest.lines() {
    let trimmed = line.trim();
    if let Some((key, value)) = trimmed.split_once(':') {
      let key = key.trim();
      if key.eq_ignore_ascii_case("BREAKING CHANGE") || key.eq_ignore_ascii_case("BREAKING-CHANGE") {
        breaking_note = Some(value.trim().to_string());
        break;
      }
    }
  }

  Some(ParsedHeader {
    commit_type,
    scope: scope.map(|s: &str| s.trim().to_string()),
    description: description.trim().to_string(),
    breaking: bang.is_some() || breaking_note.is_some(),
    breaking_note,
  })
}
