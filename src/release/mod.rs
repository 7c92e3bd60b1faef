//! Tag and hosted-release publishing
//!
//! Tags are annotated `v<version>` refs; a hosted release on top of a tag is
//! optional and requires the release CLI plus a resolvable `owner/repo`
//! pair. Nothing in this module is fatal to a backup run: every failure path
//! degrades to a logged warning (or debug note) and a skipped step.

pub mod host;
pub mod remote;

pub use host::{GhCli, ReleaseHost};
pub use remote::RemoteDescriptor;

use crate::core::error::BackstopResult;
use crate::core::vcs::VersionControl;
use crate::logger::Logger;
use chrono::Local;

/// Tag name for a version
pub fn tag_name(version: &str) -> String {
  format!("v{}", version)
}

/// Create and push an annotated tag for a version
///
/// Returns the tag name, or `None` (with a WARN) when a tag of that name
/// already exists or creation/push fails. An existing tag is never
/// overwritten.
pub fn create_tag(vcs: &dyn VersionControl, logger: &Logger, version: &str, commit: &str) -> Option<String> {
  let tag = tag_name(version);

  if vcs.tag_exists(&tag) {
    logger.warn(&format!("Tag {} already exists, skipping", tag), &[("tag", tag.clone())]);
    return None;
  }

  let result: BackstopResult<()> = vcs
    .create_tag(&tag, &format!("Version {}", version), commit)
    .and_then(|_| vcs.push_tag(&tag));

  match result {
    Ok(()) => {
      logger.success(
        &format!("Tag {} created and pushed", tag),
        &[("version", version.to_string()), ("tag", tag.clone())],
      );
      Some(tag)
    }
    Err(err) => {
      logger.warn(&format!("Could not create tag {}: {}", tag, err), &[]);
      None
    }
  }
}

/// Create a hosted release for an existing tag
///
/// Missing CLI, missing remote and host failures all degrade to a skipped
/// release. The missing-CLI case logs at DEBUG unless the release was
/// explicitly requested, in which case it warrants a WARN.
pub fn create_hosted_release(
  vcs: &dyn VersionControl,
  host: &dyn ReleaseHost,
  logger: &Logger,
  version: &str,
  tag: &str,
  explicitly_requested: bool,
) -> bool {
  if !host.is_available() {
    let message = "GitHub CLI not available, skipping release creation";
    if explicitly_requested {
      logger.warn(message, &[]);
    } else {
      logger.debug(message, &[]);
    }
    return false;
  }

  let Some(url) = vcs.remote_url() else {
    logger.warn("Could not determine remote URL, skipping release creation", &[]);
    return false;
  };

  let Some(remote) = RemoteDescriptor::parse(&url) else {
    logger.warn("Could not extract owner/repo from remote URL, skipping release creation", &[]);
    return false;
  };

  let title = format!("Version {}", version);
  let created = Local::now().format("%d-%m-%Y %H:%M:%S");
  let notes = format!("Automated release of version {}\n\nBackup created: {}", version, created);

  match host.create_release(&remote, tag, &title, &notes) {
    Ok(()) => {
      logger.success(
        &format!("GitHub release created for {}", tag),
        &[
          ("version", version.to_string()),
          ("tag", tag.to_string()),
          ("repo", remote.slug()),
        ],
      );
      true
    }
    Err(err) => {
      logger.warn(&format!("Could not create GitHub release: {}", err), &[]);
      false
    }
  }
}
