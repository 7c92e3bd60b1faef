//! Release-hosting capability
//!
//! The optional `gh` CLI handles authenticated pushes and hosted releases.
//! It is probed per run; everything it offers degrades gracefully when the
//! binary is missing.

use super::remote::RemoteDescriptor;
use crate::core::error::{BackstopError, BackstopResult, ResultExt};
use std::process::{Command, Stdio};

/// Capability interface over the release-hosting CLI
pub trait ReleaseHost {
  /// Whether the CLI is installed and runnable
  fn is_available(&self) -> bool;

  /// Best-effort credential refresh before a push; failures are swallowed
  fn refresh_auth(&self);

  /// Create a hosted release for an existing tag
  fn create_release(&self, remote: &RemoteDescriptor, tag: &str, title: &str, notes: &str) -> BackstopResult<()>;
}

/// GitHub CLI implementation
pub struct GhCli;

impl ReleaseHost for GhCli {
  fn is_available(&self) -> bool {
    Command::new("gh")
      .arg("--version")
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status()
      .map(|status| status.success())
      .unwrap_or(false)
  }

  fn refresh_auth(&self) {
    let _ = Command::new("gh")
      .args(["auth", "refresh", "-h", "github.com", "-s", "write:packages"])
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status();
  }

  fn create_release(&self, remote: &RemoteDescriptor, tag: &str, title: &str, notes: &str) -> BackstopResult<()> {
    let repo = remote.slug();
    let output = Command::new("gh")
      .args([
        "release",
        "create",
        tag,
        "--title",
        title,
        "--notes",
        notes,
        "--repo",
        repo.as_str(),
      ])
      .output()
      .context("Failed to execute gh release create")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BackstopError::message(format!(
        "gh release create failed: {}",
        stderr.trim()
      )));
    }

    Ok(())
  }
}
