//! Release command: bump the manifest, tag, and publish
//!
//! Unlike the threshold-triggered tagging inside a backup run, this is the
//! deliberate path: it refuses to run from a non-default branch or a dirty
//! tree unless `--auto` overrides the preflight, and a failed tag or
//! manifest update fails the command.

use crate::core::config::Config;
use crate::core::error::{BackstopError, BackstopResult, ResultExt, ValidationError};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::core::version;
use crate::logger::Logger;
use crate::release::{self, GhCli, ReleaseHost};

/// Run a manual release against the real git repository and gh CLI
pub fn run_release(config: &Config, version_override: Option<String>, auto: bool) -> BackstopResult<()> {
  let logger = Logger::new(config);
  let vcs = SystemGit::open(&config.project_root)?;
  execute(config, &logger, &vcs, &GhCli, version_override, auto)
}

pub(crate) fn execute(
  config: &Config,
  logger: &Logger,
  vcs: &dyn VersionControl,
  host: &dyn ReleaseHost,
  version_override: Option<String>,
  auto: bool,
) -> BackstopResult<()> {
  logger.info("Release creation started", &[]);

  let branch = vcs.current_branch();
  if branch != "main" && branch != "master" {
    logger.warn(&format!("On branch '{}', not main/master", branch), &[]);
    if !auto {
      return Err(BackstopError::Validation(ValidationError::NotOnDefaultBranch { branch }));
    }
  }

  let dirty = !vcs.status().is_empty();
  if dirty && !auto {
    logger.warn("There are uncommitted changes", &[]);
    return Err(BackstopError::Validation(ValidationError::DirtyWorkingTree));
  }

  let version = match version_override {
    Some(version) => version,
    None => version::next_version(&config.manifest_path(), true),
  };
  logger.info(&format!("Using version: {}", version), &[("version", version.clone())]);

  version::persist_version(&config.manifest_path(), &version).context("Could not update the manifest version")?;
  logger.info(&format!("Manifest version updated to {}", version), &[]);

  // The bump commit goes out before tagging so the tag carries the
  // updated manifest
  let bump_result = vcs
    .stage("package.json")
    .and_then(|_| vcs.commit(&format!("Bump version to {}", version)))
    .and_then(|_| vcs.push(&branch));
  if let Err(err) = bump_result {
    logger.warn(&format!("Could not commit the manifest bump: {}", err), &[]);
  }

  let head = vcs.head_commit()?;
  let Some(tag) = release::create_tag(vcs, logger, &version, &head) else {
    return Err(BackstopError::message(format!(
      "Could not create tag for version {}",
      version
    )));
  };

  if release::create_hosted_release(vcs, host, logger, &version, &tag, true) {
    logger.success(&format!("Release {} created", version), &[("tag", tag)]);
  } else {
    logger.warn("Tag was created, but the hosted release was not", &[]);
  }

  Ok(())
}
