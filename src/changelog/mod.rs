//! Markdown change log maintenance
//!
//! `CHANGELOG.md` carries three marker-located regions: a commit overview,
//! a bounded commit-history table, and an append-only backup-event list.
//! Updates go through a parse → mutate → render cycle so region replacement
//! is structural, never offset arithmetic. The overview and history regions
//! are rebuilt wholesale from freshly queried commits on every update; the
//! backup-log region only ever grows, newest entry first.

use crate::core::error::BackstopResult;
use crate::core::vcs::CommitInfo;
use chrono::Local;
use std::fs;
use std::path::Path;

pub const TITLE: &str = "# Changelog";
pub const OVERVIEW_HEADING: &str = "## Commit Overview";
pub const HISTORY_HEADING: &str = "## Commit History";
pub const BACKUP_LOGS_HEADING: &str = "## Backup Logs";

/// In-memory form of the change-log document
#[derive(Debug, Clone, Default)]
pub struct ChangelogDoc {
  /// Commits rendered into the overview and history regions, newest first
  history: Vec<CommitInfo>,
  /// Raw backup-event lines, newest first, preserved verbatim across updates
  backup_entries: Vec<String>,
}

impl ChangelogDoc {
  /// Load the document from disk, or start an empty one when absent
  ///
  /// Only the backup-event region survives a reload; the generated regions
  /// are replaced before the next render anyway.
  pub fn load(path: &Path) -> BackstopResult<Self> {
    if !path.exists() {
      return Ok(Self::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(Self {
      history: Vec::new(),
      backup_entries: parse_backup_entries(&content),
    })
  }

  /// Replace the overview/history source data with freshly queried commits
  pub fn set_history(&mut self, commits: Vec<CommitInfo>) {
    self.history = commits;
  }

  /// Record a backup event; the new entry lands directly under the heading
  pub fn record_event(&mut self, commit: &CommitInfo) {
    self.backup_entries.insert(0, format_backup_entry(commit));
  }

  /// Number of recorded backup events
  #[allow(dead_code)] // Exercised in tests
  pub fn backup_entry_count(&self) -> usize {
    self.backup_entries.len()
  }

  /// Render the full document as Markdown
  pub fn render(&self) -> String {
    let updated = Local::now().format("%d-%m-%Y %H:%M:%S");
    let mut out = String::new();

    out.push_str(TITLE);
    out.push_str("\n\n");
    out.push_str(&format!("_Last updated: {}_\n\n", updated));

    out.push_str(OVERVIEW_HEADING);
    out.push_str("\n\n```\n");
    for commit in &self.history {
      out.push_str(&format!(
        "* {} {} ({}, {})\n",
        commit.short_hash(),
        commit.subject,
        commit.author,
        short_date(&commit.iso_date)
      ));
    }
    out.push_str("```\n\n");

    out.push_str(HISTORY_HEADING);
    out.push_str("\n\n");
    out.push_str("| Hash | Author | Date | Message |\n");
    out.push_str("|------|--------|------|---------|\n");
    for commit in &self.history {
      out.push_str(&format!(
        "| `{}` | {} | {} | {} |\n",
        commit.short_hash(),
        escape_cell(&commit.author),
        short_date(&commit.iso_date),
        escape_cell(&commit.subject)
      ));
    }
    out.push('\n');

    out.push_str(BACKUP_LOGS_HEADING);
    out.push_str("\n\n");
    for entry in &self.backup_entries {
      out.push_str(entry);
      out.push('\n');
    }

    out
  }

  /// Write the rendered document to disk
  pub fn save(&self, path: &Path) -> BackstopResult<()> {
    fs::write(path, self.render())?;
    Ok(())
  }
}

/// One backup-event line: iso date, short hash, message, author
fn format_backup_entry(commit: &CommitInfo) -> String {
  format!(
    "- **{}** `{}` {} ({} <{}>)",
    commit.iso_date,
    commit.short_hash(),
    commit.subject,
    commit.author,
    commit.email
  )
}

/// Collect the backup-event lines below their heading, in document order
fn parse_backup_entries(content: &str) -> Vec<String> {
  let mut entries = Vec::new();
  let mut in_region = false;

  for line in content.lines() {
    if line.trim() == BACKUP_LOGS_HEADING {
      in_region = true;
      continue;
    }
    if in_region {
      if line.starts_with("## ") {
        break;
      }
      if line.starts_with("- ") {
        entries.push(line.to_string());
      }
    }
  }

  entries
}

/// `YYYY-MM-DD` prefix of a strict ISO timestamp
fn short_date(iso_date: &str) -> &str {
  if iso_date.len() >= 10 { &iso_date[..10] } else { iso_date }
}

/// Keep commit subjects from breaking the Markdown table
fn escape_cell(text: &str) -> String {
  text.replace('|', "\\|")
}
