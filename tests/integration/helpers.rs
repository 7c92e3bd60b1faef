//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway project with git history and (optionally) a bare file remote
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub remote_path: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace with an initial commit pushed to a bare remote
  pub fn new() -> Result<Self> {
    let ws = Self::without_remote()?;

    let init = Command::new("git")
      .arg("init")
      .arg("--bare")
      .arg("--initial-branch=main")
      .arg(&ws.remote_path)
      .output()
      .context("Failed to init bare remote")?;
    anyhow::ensure!(init.status.success(), "git init --bare failed");

    git(&ws.path, &["remote", "add", "origin", &ws.remote_path.to_string_lossy()])?;
    git(&ws.path, &["push", "-u", "origin", "main"])?;

    Ok(ws)
  }

  /// Create a workspace with no origin remote configured
  pub fn without_remote() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote_path = root.path().join("remote.git");
    std::fs::create_dir_all(&path)?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    // logs/ and CHANGELOG.md are backstop outputs; git-ignoring them lets
    // the tree settle back to clean between runs
    std::fs::write(path.join(".gitignore"), "logs/\nCHANGELOG.md\n")?;
    std::fs::write(
      path.join("package.json"),
      "{\n  \"name\": \"demo-site\",\n  \"version\": \"1.2.3\"\n}\n",
    )?;
    std::fs::create_dir_all(path.join("src"))?;
    std::fs::write(path.join("src/index.ts"), "export const hello = 'world';\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial project setup"])?;

    Ok(Self {
      _root: root,
      path,
      remote_path,
    })
  }

  /// Write a file relative to the project root
  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(rel);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Read a file relative to the project root
  pub fn read_file(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }

  /// Check if a file exists
  pub fn file_exists(&self, rel: &str) -> bool {
    self.path.join(rel).exists()
  }

  /// Overwrite the manifest with the given version
  pub fn set_manifest_version(&self, version: &str) -> Result<()> {
    self.write_file(
      "package.json",
      &format!("{{\n  \"name\": \"demo-site\",\n  \"version\": \"{}\"\n}}\n", version),
    )
  }

  /// Number of commits on HEAD
  pub fn commit_count(&self) -> Result<usize> {
    let output = git(&self.path, &["rev-list", "--count", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// Subject of the most recent commit
  pub fn last_commit_message(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// All local tag names
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "-l"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Number of commits on the remote's main branch
  pub fn remote_commit_count(&self) -> Result<usize> {
    let output = git(&self.remote_path, &["rev-list", "--count", "main"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// All tag names on the remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.remote_path, &["tag", "-l"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the backstop binary; the caller inspects the exit status
///
/// The backup-related environment flags are cleared so the ambient test
/// environment cannot leak into a run; tests opt back in via `envs`.
pub fn backstop(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_backstop");

  let mut cmd = Command::new(bin);
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("CREATE_RELEASE")
    .env_remove("AUTO_TAG")
    .env_remove("DEBUG");
  for (key, value) in envs {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run backstop")
}

/// Run the backstop binary and fail the test on a non-zero exit
pub fn backstop_ok(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let output = backstop(cwd, args, envs)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "backstop command failed: backstop {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
