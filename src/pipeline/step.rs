//! Named pipeline steps and their fixed execution order

use serde::Serialize;
use std::fmt;

/// A lifecycle step. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
  AnalyzeCommits,
  GenerateNotes,
  /// Changelog and manifest rewrites
  UpdateFiles,
  /// External build side effects
  Prepare,
  Publish,
  CommitBack,
}

impl Step {
  /// Every step, in execution order
  pub const ALL: [Step; 6] = [
    Step::AnalyzeCommits,
    Step::GenerateNotes,
    Step::UpdateFiles,
    Step::Prepare,
    Step::Publish,
    Step::CommitBack,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Step::AnalyzeCommits => "analyze-commits",
      Step::GenerateNotes => "generate-notes",
      Step::UpdateFiles => "update-files",
      Step::Prepare => "prepare",
      Step::Publish => "publish",
      Step::CommitBack => "commit-back",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
