//! Setup command: environment diagnostics and hook installation
//!
//! Checks the pieces the backup workflow relies on (git repository, gh CLI,
//! origin remote) and installs a post-commit hook that runs a backup after
//! every commit. Missing optional pieces are reported, not fatal.

use crate::core::config::Config;
use crate::core::error::{BackstopError, BackstopResult};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::release::{GhCli, ReleaseHost};
use std::fs;
use std::path::Path;

const HOOK_CONTENT: &str = "#!/bin/sh\n# Installed by backstop: back up automatically after every commit\n\nbackstop backup --trigger hook\n";

/// Configure automatic backups for the current project
pub fn run_setup(config: &Config) -> BackstopResult<()> {
  println!("🚀 Configuring automatic backups...\n");

  let git_dir = config.project_root.join(".git");
  if !git_dir.exists() {
    return Err(BackstopError::with_help(
      "This is not a git repository",
      "Initialize one first: git init",
    ));
  }

  if GhCli.is_available() {
    println!("✅ GitHub CLI (gh) is installed");
  } else {
    println!("⚠️  GitHub CLI (gh) not found");
    println!("   Install it from https://cli.github.com, then authenticate: gh auth login");
  }

  let vcs = SystemGit::open(&config.project_root)?;
  match vcs.remote_url() {
    Some(url) => println!("✅ Git remote found: {}", url),
    None => {
      println!("⚠️  No git remote configured");
      println!("   Add one with: git remote add origin <url>");
    }
  }
  if let Some(tag) = vcs.latest_tag() {
    println!("✅ Latest tag: {}", tag);
  }

  install_post_commit_hook(&git_dir)?;
  println!("✅ Post-commit hook installed");

  println!("\n✅ Setup complete!");
  println!("\n📋 What was configured:");
  println!("   • Post-commit hook: automatic backup after every commit");
  println!("   • Watch mode: backstop watch for continuous monitoring");
  println!("   • Manual backup: backstop backup");
  println!("   • Logging: entries are written to logs/backup.log");
  println!("\n💡 Tips:");
  println!("   • Start watch mode: backstop watch");
  println!("   • Make a manual backup: backstop backup");
  println!("   • View the log: backstop logs (or backstop logs --tail)");
  println!("\n📁 Log file: {}", config.log_path().display());

  Ok(())
}

/// Write the post-commit hook and make it executable
fn install_post_commit_hook(git_dir: &Path) -> BackstopResult<()> {
  let hooks_dir = git_dir.join("hooks");
  fs::create_dir_all(&hooks_dir)?;

  let hook_path = hooks_dir.join("post-commit");
  fs::write(&hook_path, HOOK_CONTENT)?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(&hook_path, fs::Permissions::from_mode(0o755))?;
  }

  Ok(())
}
