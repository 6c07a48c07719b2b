//! Release notes rendering from classified commits
//!
//! Output is a pure function of (version, date, commits, settings): no
//! clock reads, no hash-map iteration order.

use crate::release::commits::{CommitRecord, CommitType};
use std::collections::BTreeMap;

/// Commit types listed in the notes unless configured otherwise
pub const DEFAULT_SECTIONS: [CommitType; 4] = [CommitType::Feat, CommitType::Fix, CommitType::Perf, CommitType::Revert];

/// Display order of sections
const SECTION_ORDER: [CommitType; 12] = [
  CommitType::Feat,
  CommitType::Fix,
  CommitType::Perf,
  CommitType::Revert,
  CommitType::Docs,
  CommitType::Refactor,
  CommitType::Test,
  CommitType::Build,
  CommitType::Ci,
  CommitType::Chore,
  CommitType::Style,
  CommitType::Other,
];

/// Notes for one release
#[derive(Debug, Clone)]
pub struct ReleaseNotes {
  /// Version for this entry
  pub version: String,
  /// Date of the release (ISO 8601 date)
  pub date: String,
  /// Commits grouped by type, preserving commit order inside a group
  pub commits_by_type: BTreeMap<CommitType, Vec<CommitRecord>>,
  /// Breaking commits, in commit order
  pub breaking: Vec<CommitRecord>,
}

impl ReleaseNotes {
  pub fn new(version: String, date: String) -> Self {
    Self {
      version,
      date,
      commits_by_type: BTreeMap::new(),
      breaking: Vec::new(),
    }
  }

  /// Add a commit; unclassified commits are ignored
  pub fn add_commit(&mut self, commit: &CommitRecord) {
    let Some(commit_type) = commit.parsed_type else {
      return;
    };
    if commit.breaking {
      self.breaking.push(commit.clone());
    }
    self.commits_by_type.entry(commit_type).or_default().push(commit.clone());
  }

  /// Render as markdown, listing only `sections` plus breaking changes
  pub fn to_markdown(&self, sections: &[CommitType], include_hash: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("## [{}] - {}\n", self.version, self.date));

    if !self.breaking.is_empty() {
      output.push_str("\n### ⚠ BREAKING CHANGES\n\n");
      for commit in &self.breaking {
        let text = commit.breaking_note.as_deref().unwrap_or(&commit.description);
        output.push_str(&format!("- {}{}\n", scope_prefix(commit), text));
      }
    }

    for commit_type in SECTION_ORDER.iter().filter(|t| sections.contains(t)) {
      let Some(commits) = self.commits_by_type.get(commit_type) else {
        continue;
      };
      if commits.is_empty() {
        continue;
      }

      output.push_str(&format!("\n### {}\n\n", commit_type.display_name()));
      for commit in commits {
        output.push_str(&format!("- {}{}", scope_prefix(commit), commit.description));
        if include_hash {
          output.push_str(&format!(" ({})", commit.short_hash()));
        }
        output.push('\n');
      }
    }

    output
  }
}

/// Insert `entry` into changelog text, newest first
///
/// A missing file starts with `title` followed by a blank line. Otherwise the
/// entry goes before the first `## ` heading, keeping any preamble on top.
pub fn prepend_to_changelog(existing: Option<&str>, title: &str, entry: &str) -> String {
  let entry = format!("{}\n", entry.trim_end());

  let Some(existing) = existing else {
    return format!("{}\n\n{}", title.trim_end(), entry);
  };

  let first_release = if existing.starts_with("## ") {
    Some(0)
  } else {
    existing.find("\n## ").map(|i| i + 1)
  };

  match first_release {
    Some(at) => {
      let (header, rest) = existing.split_at(at);
      format!("{}{}\n{}", header, entry, rest)
    }
    None if existing.trim().is_empty() => entry,
    None => format!("{}\n\n{}", existing.trim_end(), entry),
  }
}

fn scope_prefix(commit: &CommitRecord) -> String {
  commit
    .scope
    .as_ref()
    .map(|s| format!("**{}**: ", s))
    .unwrap_or_default()
}
