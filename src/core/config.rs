//! Runtime configuration resolved from the environment
//!
//! backstop is configured through environment variables and fixed
//! project-relative paths, resolved once at startup into a `Config` that
//! commands borrow. There is no config file: the tool is meant to be dropped
//! into a project and run with zero setup.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of changed files above which a run tags automatically
pub const AUTO_TAG_THRESHOLD: usize = 10;

/// Quiet period after the last file change before a watch-triggered backup
pub const DEBOUNCE_DELAY: Duration = Duration::from_secs(20);

/// Commits shown in the changelog overview and history regions
pub const CHANGELOG_HISTORY_DEPTH: usize = 15;

/// Resolved configuration for one backstop invocation
#[derive(Debug, Clone)]
pub struct Config {
  /// Project root (working tree root; git and all paths resolve against it)
  pub project_root: PathBuf,

  /// CREATE_RELEASE=true: bump minor, persist the version and publish a
  /// hosted release after every tagged run
  pub create_release: bool,

  /// AUTO_TAG=true: tag every run without creating a hosted release
  pub auto_tag: bool,

  /// DEBUG=true: mirror DEBUG-level log entries to the console
  pub debug: bool,
}

impl Config {
  /// Resolve configuration from the environment for the given project root
  pub fn from_env(project_root: &Path) -> Self {
    Self {
      project_root: project_root.to_path_buf(),
      create_release: env_flag("CREATE_RELEASE"),
      auto_tag: env_flag("AUTO_TAG"),
      debug: env_flag("DEBUG"),
    }
  }

  /// Path of the JSON manifest holding the current version
  pub fn manifest_path(&self) -> PathBuf {
    self.project_root.join("package.json")
  }

  /// Path of the Markdown change log
  pub fn changelog_path(&self) -> PathBuf {
    self.project_root.join("CHANGELOG.md")
  }

  /// Directory holding the backup log
  pub fn logs_dir(&self) -> PathBuf {
    self.project_root.join("logs")
  }

  /// Path of the append-only backup log
  pub fn log_path(&self) -> PathBuf {
    self.logs_dir().join("backup.log")
  }
}

/// True when the variable is set to the literal string "true"
fn env_flag(name: &str) -> bool {
  env::var(name).map(|v| v == "true").unwrap_or(false)
}
