//! In-memory `VersionControl` double for unit tests

use super::{ChangeKind, CommitInfo, VersionControl};
use crate::core::error::{BackstopError, BackstopResult, GitError};
use std::cell::{Cell, RefCell};

/// Records every mutating operation; failure behavior is scripted per test
pub struct FakeVcs {
  pub changes: Vec<(ChangeKind, String)>,
  pub branch: String,
  pub remote: Option<String>,
  pub author: String,
  pub email: String,

  /// Number of upcoming branch pushes that should fail
  pub failing_pushes: Cell<usize>,
  pub fail_commit: bool,

  pub staged: Cell<bool>,
  pub commits: RefCell<Vec<String>>,
  pub pushes: RefCell<Vec<String>>,
  pub tags: RefCell<Vec<String>>,
  pub pushed_tags: RefCell<Vec<String>>,
}

impl FakeVcs {
  pub fn with_changes(paths: &[&str]) -> Self {
    Self {
      changes: paths.iter().map(|p| (ChangeKind::Modified, p.to_string())).collect(),
      branch: "main".to_string(),
      remote: Some("https://github.com/acme/site.git".to_string()),
      author: "Alice".to_string(),
      email: "alice@example.com".to_string(),
      failing_pushes: Cell::new(0),
      fail_commit: false,
      staged: Cell::new(false),
      commits: RefCell::new(Vec::new()),
      pushes: RefCell::new(Vec::new()),
      tags: RefCell::new(Vec::new()),
      pushed_tags: RefCell::new(Vec::new()),
    }
  }

  fn synthetic_hash(&self, index: usize) -> String {
    format!("{:0>40}", format!("fa{}", index))
  }

  fn commit_info(&self, index: usize, subject: &str) -> CommitInfo {
    CommitInfo {
      hash: self.synthetic_hash(index),
      author: self.author.clone(),
      email: self.email.clone(),
      iso_date: "2025-03-07T09:05:00+01:00".to_string(),
      subject: subject.to_string(),
    }
  }
}

impl VersionControl for FakeVcs {
  fn status(&self) -> Vec<(ChangeKind, String)> {
    if self.commits.borrow().is_empty() {
      self.changes.clone()
    } else {
      // Committed in a previous step of the same test run
      Vec::new()
    }
  }

  fn current_branch(&self) -> String {
    self.branch.clone()
  }

  fn remote_url(&self) -> Option<String> {
    self.remote.clone()
  }

  fn latest_tag(&self) -> Option<String> {
    self.tags.borrow().last().cloned()
  }

  fn last_commit(&self) -> BackstopResult<CommitInfo> {
    let commits = self.commits.borrow();
    let index = commits.len();
    let subject = commits
      .last()
      .cloned()
      .ok_or_else(|| BackstopError::message("No commits recorded"))?;
    Ok(self.commit_info(index, &subject))
  }

  fn recent_commits(&self, limit: usize) -> BackstopResult<Vec<CommitInfo>> {
    let commits = self.commits.borrow();
    Ok(
      commits
        .iter()
        .enumerate()
        .rev()
        .take(limit)
        .map(|(i, subject)| self.commit_info(i + 1, subject))
        .collect(),
    )
  }

  fn stage_all(&self) -> BackstopResult<()> {
    self.staged.set(true);
    Ok(())
  }

  fn stage(&self, _path: &str) -> BackstopResult<()> {
    self.staged.set(true);
    Ok(())
  }

  fn commit(&self, message: &str) -> BackstopResult<()> {
    if self.fail_commit {
      return Err(BackstopError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: "scripted commit failure".to_string(),
      }));
    }
    self.commits.borrow_mut().push(message.to_string());
    Ok(())
  }

  fn head_commit(&self) -> BackstopResult<String> {
    Ok(self.synthetic_hash(self.commits.borrow().len()))
  }

  fn push(&self, branch: &str) -> BackstopResult<()> {
    let failing = self.failing_pushes.get();
    if failing > 0 {
      self.failing_pushes.set(failing - 1);
      return Err(BackstopError::Git(GitError::PushFailed {
        remote: "origin".to_string(),
        branch: branch.to_string(),
        reason: "scripted push failure".to_string(),
      }));
    }
    self.pushes.borrow_mut().push(branch.to_string());
    Ok(())
  }

  fn tag_exists(&self, tag: &str) -> bool {
    self.tags.borrow().iter().any(|t| t == tag)
  }

  fn create_tag(&self, tag: &str, _message: &str, _commit: &str) -> BackstopResult<()> {
    self.tags.borrow_mut().push(tag.to_string());
    Ok(())
  }

  fn push_tag(&self, tag: &str) -> BackstopResult<()> {
    self.pushed_tags.borrow_mut().push(tag.to_string());
    Ok(())
  }
}
