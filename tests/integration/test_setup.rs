//! Integration tests for `backstop setup`

use crate::helpers::{TestWorkspace, backstop, backstop_ok};
use anyhow::Result;

#[test]
fn test_setup_installs_post_commit_hook() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = backstop_ok(&ws.path, &["setup"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Post-commit hook installed"));
  assert!(stdout.contains("Setup complete"));

  let hook = ws.read_file(".git/hooks/post-commit")?;
  assert!(hook.starts_with("#!/bin/sh"));
  assert!(hook.contains("backstop backup --trigger hook"));

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(ws.path.join(".git/hooks/post-commit"))?
      .permissions()
      .mode();
    assert_eq!(mode & 0o111, 0o111, "hook must be executable");
  }

  Ok(())
}

#[test]
fn test_setup_reports_remote() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = backstop_ok(&ws.path, &["setup"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Git remote found"));

  Ok(())
}

#[test]
fn test_setup_warns_without_remote() -> Result<()> {
  let ws = TestWorkspace::without_remote()?;

  let output = backstop_ok(&ws.path, &["setup"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No git remote configured"));

  Ok(())
}

#[test]
fn test_setup_outside_repo_fails() -> Result<()> {
  let dir = tempfile::tempdir()?;

  let output = backstop(dir.path(), &["setup"], &[])?;

  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not a git repository"));
  assert!(stderr.contains("git init"));

  Ok(())
}

#[test]
fn test_setup_is_idempotent() -> Result<()> {
  let ws = TestWorkspace::new()?;

  backstop_ok(&ws.path, &["setup"], &[])?;
  backstop_ok(&ws.path, &["setup"], &[])?;

  let hook = ws.read_file(".git/hooks/post-commit")?;
  assert_eq!(hook.matches("backstop backup").count(), 1);

  Ok(())
}
