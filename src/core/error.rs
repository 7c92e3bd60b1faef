//! Error types for backstop with contextual messages and exit codes
//!
//! A backup run is deliberately hard to kill: introspection failures degrade
//! to safe defaults and push/tag/release/changelog failures are logged as
//! warnings. The errors in this module are reserved for the conditions that
//! genuinely end a run (staging or commit failing, broken setup, bad input).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for backstop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (invalid args, missing files, aborted preflight)
  User = 1,
  /// System error (git, I/O, subprocess)
  System = 2,
  /// Validation failure (release preflight checks)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for backstop
#[derive(Debug)]
pub enum BackstopError {
  /// Git operation errors
  Git(GitError),

  /// Release preflight validation errors
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BackstopError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BackstopError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BackstopError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BackstopError::Message { message, context, help } => BackstopError::Message {
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
      BackstopError::Git(_) => ExitCode::System,
      BackstopError::Validation(_) => ExitCode::Validation,
      BackstopError::Io(_) => ExitCode::System,
      BackstopError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BackstopError::Git(e) => e.help_message(),
      BackstopError::Validation(e) => e.help_message(),
      BackstopError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for BackstopError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BackstopError::Git(e) => write!(f, "{}", e),
      BackstopError::Validation(e) => write!(f, "{}", e),
      BackstopError::Io(e) => write!(f, "I/O error: {}", e),
      BackstopError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BackstopError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BackstopError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BackstopError {
  fn from(err: io::Error) -> Self {
    BackstopError::Io(err)
  }
}

impl From<String> for BackstopError {
  fn from(msg: String) -> Self {
    BackstopError::message(msg)
  }
}

impl From<&str> for BackstopError {
  fn from(msg: &str) -> Self {
    BackstopError::message(msg)
  }
}

impl From<serde_json::Error> for BackstopError {
  fn from(err: serde_json::Error) -> Self {
    BackstopError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for BackstopError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    BackstopError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<notify::Error> for BackstopError {
  fn from(err: notify::Error) -> Self {
    BackstopError::message(format!("File watcher error: {}", err))
  }
}

impl From<ctrlc::Error> for BackstopError {
  fn from(err: ctrlc::Error) -> Self {
    BackstopError::message(format!("Signal handler error: {}", err))
  }
}

/// Convert anyhow::Error to BackstopError (test helpers and interop)
impl From<anyhow::Error> for BackstopError {
  fn from(err: anyhow::Error) -> Self {
    BackstopError::message(err.to_string())
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first, then re-run the backup.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your credentials. Run `gh auth login` or configure a git credential helper.".to_string())
        } else {
          Some("The commit is safe locally. Push manually with `git push` once the remote is reachable.".to_string())
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first with `git init` or check the path: {}",
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
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
    }
  }
}

/// Release preflight validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Release requested from a non-default branch without --auto
  NotOnDefaultBranch { branch: String },

  /// Release requested with uncommitted changes without --auto
  DirtyWorkingTree,
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::NotOnDefaultBranch { .. } => {
        Some("Switch to main/master, or pass --auto to release from this branch anyway.".to_string())
      }
      ValidationError::DirtyWorkingTree => {
        Some("Commit your changes first (or run `backstop backup`), or pass --auto to proceed.".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::NotOnDefaultBranch { branch } => {
        write!(f, "On branch '{}', not main/master", branch)
      }
      ValidationError::DirtyWorkingTree => {
        write!(f, "The working tree has uncommitted changes")
      }
    }
  }
}

/// Result type alias for backstop
pub type BackstopResult<T> = Result<T, BackstopError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BackstopResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BackstopResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BackstopError>,
{
  fn context(self, ctx: impl Into<String>) -> BackstopResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BackstopResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}
