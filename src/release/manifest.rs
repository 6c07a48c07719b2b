//! Version-string rewriting in build manifests
//!
//! Each rule rewrites the first line matching its `search` regex in every
//! file its `files` pattern selects. The `replace` template gets the version
//! substituted first and is then expanded against the match, so capture
//! references such as `${1}` keep working.

use crate::core::config::{ManifestRule, VERSION_PLACEHOLDER};
use crate::core::error::{ManifestRewriteError, ReleaseResult, ResultExt};
use crate::release::assets;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Apply one rule under `root`; returns the rewritten files (root-relative)
pub fn apply_rule(root: &Path, rule: &ManifestRule, version: &str) -> ReleaseResult<Vec<PathBuf>> {
  let search = Regex::new(&rule.search)?;
  let template = rule.replace.replace(VERSION_PLACEHOLDER, version);

  let files = if assets::is_wildcard(&rule.files) {
    assets::expand(root, &rule.files)?
  } else if root.join(&rule.files).is_file() {
    vec![PathBuf::from(&rule.files)]
  } else {
    Vec::new()
  };

  if files.is_empty() {
    return Err(
      ManifestRewriteError::FileNotFound {
        pattern: rule.files.clone(),
      }
      .into(),
    );
  }

  for file in &files {
    let path = root.join(file);
    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let rewritten = rewrite_first_match(&content, &search, &template).ok_or_else(|| ManifestRewriteError::NoMatch {
      file: file.clone(),
      search: rule.search.clone(),
    })?;

    fs::write(&path, rewritten).with_context(|| format!("Failed to write manifest {}", path.display()))?;
  }

  Ok(files)
}

/// Replace the match on the first matching line; `None` if no line matches
///
/// Line endings are preserved exactly, including a missing final newline.
pub fn rewrite_first_match(content: &str, search: &Regex, template: &str) -> Option<String> {
  let mut output = String::with_capacity(content.len() + template.len());
  let mut replaced = false;

  for line in content.split_inclusive('\n') {
    if replaced {
      output.push_str(line);
      continue;
    }

    let (body, ending) = split_line_ending(line);
    if search.is_match(body) {
      output.push_str(&search.replace(body, template));
      output.push_str(ending);
      replaced = true;
    } else {
      output.push_str(line);
    }
  }

  replaced.then_some(output)
}

fn split_line_ending(line: &str) -> (&str, &str) {
  if let Some(body) = line.strip_suffix("\r\n") {
    (body, "\r\n")
  } else if let Some(body) = line.strip_suffix('\n') {
    (body, "\n")
  } else {
    (line, "")
  }
}
