//! Backup command: stage, commit, push, and conditionally tag
//!
//! One run walks a fixed sequence: status check → stage → commit → push
//! (primary, then ambient-credential fallback) → optional tag/release →
//! change-log update. A clean tree ends the run successfully before staging.
//! Push, tag, release and change-log failures are warnings; only staging or
//! the commit itself can fail a run.

use crate::changelog::ChangelogDoc;
use crate::core::config::{AUTO_TAG_THRESHOLD, CHANGELOG_HISTORY_DEPTH, Config};
use crate::core::error::BackstopResult;
use crate::core::vcs::{SystemGit, VersionControl};
use crate::core::version;
use crate::logger::Logger;
use crate::release::{self, GhCli, ReleaseHost};
use chrono::{DateTime, Local};
use clap::ValueEnum;

/// What started this backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Trigger {
  /// Invoked directly from the command line
  Manual,
  /// Fired by the file-system watcher after a quiet period
  Watch,
  /// Fired by the installed post-commit hook
  Hook,
}

impl Trigger {
  pub fn as_str(self) -> &'static str {
    match self {
      Trigger::Manual => "manual",
      Trigger::Watch => "watch",
      Trigger::Hook => "hook",
    }
  }
}

impl std::fmt::Display for Trigger {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How the push phase of a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
  /// Nothing to push (clean tree)
  Skipped,
  /// First attempt succeeded
  Pushed,
  /// First attempt failed, ambient-credential retry succeeded
  PushedViaFallback,
  /// Both attempts failed; the commit remains local
  Failed,
}

impl PushOutcome {
  fn as_str(self) -> &'static str {
    match self {
      PushOutcome::Skipped => "skipped",
      PushOutcome::Pushed => "pushed",
      PushOutcome::PushedViaFallback => "pushed-via-fallback",
      PushOutcome::Failed => "failed",
    }
  }
}

/// Record of one backup run, flattened into the final log entry
#[derive(Debug)]
pub struct BackupRun {
  pub trigger: Trigger,
  pub started_at: DateTime<Local>,
  pub changed_paths: Vec<String>,
  pub commit: Option<String>,
  pub push: PushOutcome,
  pub tag: Option<String>,
}

/// Run one backup against the real git repository and gh CLI
pub fn run_backup(config: &Config, trigger: Trigger) -> BackstopResult<()> {
  let logger = Logger::new(config);
  let vcs = SystemGit::open(&config.project_root)?;
  execute(config, &logger, &vcs, &GhCli, trigger)?;
  Ok(())
}

/// The backup sequence against capability interfaces
pub(crate) fn execute(
  config: &Config,
  logger: &Logger,
  vcs: &dyn VersionControl,
  host: &dyn ReleaseHost,
  trigger: Trigger,
) -> BackstopResult<BackupRun> {
  let started_at = Local::now();
  logger.info("Backup run started", &[("trigger", trigger.as_str().to_string())]);

  let changes = vcs.status();
  if changes.is_empty() {
    logger.info("No changes to back up", &[]);
    return Ok(BackupRun {
      trigger,
      started_at,
      changed_paths: Vec::new(),
      commit: None,
      push: PushOutcome::Skipped,
      tag: None,
    });
  }

  let changed_paths: Vec<String> = changes.iter().map(|(_, path)| path.clone()).collect();
  let file_count = changed_paths.len();
  logger.info(
    &format!("Changes detected: {} file(s)", file_count),
    &[("fileCount", file_count.to_string())],
  );

  vcs.stage_all()?;
  logger.debug("All changes staged", &[]);

  let timestamp = Local::now().format("%d-%m-%Y %H:%M:%S").to_string();
  let message = format!("Auto backup: {}", timestamp);
  vcs.commit(&message)?;
  logger.debug("Commit created", &[("message", message)]);

  let mut commit_hash = vcs.head_commit()?;
  let branch = vcs.current_branch();
  logger.debug("Branch detected", &[("branch", branch.clone())]);

  let push = push_with_fallback(logger, vcs, host, &branch, &commit_hash);

  // Threshold rule: an explicit flag, or a run touching many files, tags
  let should_tag = config.create_release || config.auto_tag || file_count > AUTO_TAG_THRESHOLD;
  let tag = if should_tag {
    let version = version::next_version(&config.manifest_path(), config.create_release);

    if config.create_release {
      // Persist and commit the bump first so the tag lands on a commit
      // containing the updated manifest
      if let Some(bumped_head) = persist_and_commit_bump(config, logger, vcs, &branch, &version) {
        commit_hash = bumped_head;
      }
    }

    let tag = release::create_tag(vcs, logger, &version, &commit_hash);

    if let Some(tag_name) = &tag
      && config.create_release
    {
      release::create_hosted_release(vcs, host, logger, &version, tag_name, false);
    }

    tag
  } else {
    None
  };

  if let Err(err) = update_changelog(config, vcs) {
    logger.warn(&format!("Could not update change log: {}", err), &[]);
  }

  let run = BackupRun {
    trigger,
    started_at,
    changed_paths,
    commit: Some(commit_hash),
    push,
    tag,
  };
  log_run(logger, &run);

  Ok(run)
}

/// Push the branch, retrying once with ambient credentials
fn push_with_fallback(
  logger: &Logger,
  vcs: &dyn VersionControl,
  host: &dyn ReleaseHost,
  branch: &str,
  commit_hash: &str,
) -> PushOutcome {
  let short = short_hash(commit_hash);

  if host.is_available() {
    logger.debug("GitHub CLI available, refreshing credentials", &[]);
    host.refresh_auth();
  } else {
    logger.debug("GitHub CLI not available, pushing with ambient credentials", &[]);
  }

  match vcs.push(branch) {
    Ok(()) => {
      logger.success(
        &format!("Backup pushed to {}", branch),
        &[("branch", branch.to_string()), ("commit", short)],
      );
      PushOutcome::Pushed
    }
    Err(first) => {
      logger.warn(&format!("Push failed, retrying with ambient credentials: {}", first), &[]);

      match vcs.push(branch) {
        Ok(()) => {
          logger.success(
            &format!("Backup pushed to {}", branch),
            &[("branch", branch.to_string()), ("commit", short)],
          );
          PushOutcome::PushedViaFallback
        }
        Err(second) => {
          logger.warn(
            &format!(
              "Both push attempts failed; the commit remains local: {}. Push manually with `git push origin {}`",
              second, branch
            ),
            &[("branch", branch.to_string()), ("commit", short)],
          );
          PushOutcome::Failed
        }
      }
    }
  }
}

/// Write the bumped version into the manifest and commit it
///
/// Best-effort: a failure leaves the tag pointing at the backup commit and
/// is reported as a WARN. Returns the new HEAD when the bump was committed.
fn persist_and_commit_bump(
  config: &Config,
  logger: &Logger,
  vcs: &dyn VersionControl,
  branch: &str,
  version: &str,
) -> Option<String> {
  if let Err(err) = version::persist_version(&config.manifest_path(), version) {
    logger.warn(&format!("Could not persist version to manifest: {}", err), &[]);
    return None;
  }

  let result = vcs
    .stage("package.json")
    .and_then(|_| vcs.commit(&format!("Bump version to {}", version)))
    .and_then(|_| vcs.head_commit());

  match result {
    Ok(head) => {
      logger.debug(
        "Manifest version bumped and committed",
        &[("version", version.to_string())],
      );
      if let Err(err) = vcs.push(branch) {
        logger.warn(&format!("Could not push version bump commit: {}", err), &[]);
      }
      Some(head)
    }
    Err(err) => {
      logger.warn(&format!("Could not commit version bump: {}", err), &[]);
      None
    }
  }
}

/// Rebuild the generated changelog regions and append this run's event
fn update_changelog(config: &Config, vcs: &dyn VersionControl) -> BackstopResult<()> {
  let commits = vcs.recent_commits(CHANGELOG_HISTORY_DEPTH)?;
  let last = vcs.last_commit()?;

  let path = config.changelog_path();
  let mut doc = ChangelogDoc::load(&path)?;
  doc.set_history(commits);
  doc.record_event(&last);
  doc.save(&path)
}

fn log_run(logger: &Logger, run: &BackupRun) {
  let mut payload = vec![
    ("trigger", run.trigger.as_str().to_string()),
    ("startedAt", run.started_at.format("%d-%m-%Y %H:%M:%S").to_string()),
    ("fileCount", run.changed_paths.len().to_string()),
    ("push", run.push.as_str().to_string()),
  ];
  if let Some(commit) = &run.commit {
    payload.push(("commit", short_hash(commit)));
  }
  if let Some(tag) = &run.tag {
    payload.push(("tag", tag.clone()));
  }

  logger.success("Backup run complete", &payload);
}

fn short_hash(hash: &str) -> String {
  hash.chars().take(7).collect()
}
