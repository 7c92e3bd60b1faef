//! System git backend
//!
//! Shells out to the system git binary with an isolated environment. Query
//! failures degrade to safe defaults where the `VersionControl` contract
//! requires it; mutating operations surface real errors.

use super::{ChangeKind, CommitInfo, VersionControl, parse_porcelain, sanitize_remote_url};
use crate::core::error::{BackstopError, BackstopResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Commit log format: hash / author / email / ISO date / subject,
/// unit-separator delimited, one commit per line
const LOG_FORMAT: &str = "%H%x1f%an%x1f%ae%x1f%aI%x1f%s";

/// Git backend using the system git binary (zero crate dependencies)
#[derive(Debug)]
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open the repository containing `path`
  ///
  /// One subprocess call to resolve the working tree root.
  pub fn open(path: &Path) -> BackstopResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(BackstopError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(BackstopError::message(format!(
        "Failed to open git repository: {}",
        stderr
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);

    Ok(Self {
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables, whitelisting PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }

  /// Run a git command, mapping a non-zero exit to `GitError::CommandFailed`
  fn run(&self, args: &[&str]) -> BackstopResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BackstopError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

impl VersionControl for SystemGit {
  fn status(&self) -> Vec<(ChangeKind, String)> {
    match self.run(&["status", "--porcelain"]) {
      Ok(output) => parse_porcelain(&output),
      Err(_) => Vec::new(),
    }
  }

  fn current_branch(&self) -> String {
    match self.run(&["branch", "--show-current"]) {
      Ok(output) => {
        let branch = output.trim();
        if branch.is_empty() {
          "main".to_string() // Detached HEAD
        } else {
          branch.to_string()
        }
      }
      Err(_) => "main".to_string(),
    }
  }

  fn remote_url(&self) -> Option<String> {
    self
      .run(&["remote", "get-url", "origin"])
      .ok()
      .map(|url| sanitize_remote_url(url.trim()))
  }

  fn latest_tag(&self) -> Option<String> {
    self
      .run(&["tag", "-l", "--sort=-version:refname"])
      .ok()
      .and_then(|output| output.lines().next().map(|t| t.to_string()))
      .filter(|t| !t.is_empty())
  }

  fn last_commit(&self) -> BackstopResult<CommitInfo> {
    let format = format!("--format={}", LOG_FORMAT);
    let output = self.run(&["log", "-1", &format])?;

    parse_commit_line(output.trim_end())
      .ok_or_else(|| BackstopError::message("Failed to parse commit metadata from git log"))
  }

  fn recent_commits(&self, limit: usize) -> BackstopResult<Vec<CommitInfo>> {
    let count = format!("-{}", limit);
    let format = format!("--format={}", LOG_FORMAT);
    let output = self.run(&["log", &count, &format])?;

    Ok(output.lines().filter_map(parse_commit_line).collect())
  }

  fn stage_all(&self) -> BackstopResult<()> {
    self.run(&["add", "."])?;
    Ok(())
  }

  fn stage(&self, path: &str) -> BackstopResult<()> {
    self.run(&["add", path])?;
    Ok(())
  }

  fn commit(&self, message: &str) -> BackstopResult<()> {
    self.run(&["commit", "-m", message])?;
    Ok(())
  }

  fn head_commit(&self) -> BackstopResult<String> {
    Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
  }

  fn push(&self, branch: &str) -> BackstopResult<()> {
    let output = self
      .git_cmd()
      .args(["push", "origin", branch])
      .output()
      .context("Failed to execute git push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BackstopError::Git(GitError::PushFailed {
        remote: "origin".to_string(),
        branch: branch.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  fn tag_exists(&self, tag: &str) -> bool {
    self
      .run(&["rev-parse", "-q", "--verify", &format!("refs/tags/{}", tag)])
      .is_ok()
  }

  fn create_tag(&self, tag: &str, message: &str, commit: &str) -> BackstopResult<()> {
    self.run(&["tag", "-a", tag, "-m", message, commit])?;
    Ok(())
  }

  fn push_tag(&self, tag: &str) -> BackstopResult<()> {
    let output = self
      .git_cmd()
      .args(["push", "origin", &format!("refs/tags/{}", tag)])
      .output()
      .context("Failed to execute git push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BackstopError::Git(GitError::PushFailed {
        remote: "origin".to_string(),
        branch: tag.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }
}

/// Parse one unit-separator delimited log line into CommitInfo
fn parse_commit_line(line: &str) -> Option<CommitInfo> {
  let mut fields = line.split('\u{1f}');

  let hash = fields.next()?.to_string();
  let author = fields.next()?.to_string();
  let email = fields.next()?.to_string();
  let iso_date = fields.next()?.to_string();
  let subject = fields.next().unwrap_or("").to_string();

  if hash.is_empty() {
    return None;
  }

  Some(CommitInfo {
    hash,
    author,
    email,
    iso_date,
    subject,
  })
}
