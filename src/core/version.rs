//! Version generation from the project manifest
//!
//! The manifest is a JSON object with a `version` field. Bumps are computed
//! from the current value; when the manifest cannot be read or parsed the
//! generator degrades to a date-time version so a backup run always gets a
//! usable, monotonically-informative identifier.

use crate::core::error::{BackstopError, BackstopResult};
use chrono::{DateTime, Local};
use semver::Version;
use std::fs;
use std::path::Path;

/// Read the current version string from the manifest
///
/// Returns `None` when the file is missing, unreadable or not a JSON object.
/// A missing `version` field in an otherwise valid manifest reads as "0.0.0",
/// matching the bootstrap case below.
pub fn current_version(manifest_path: &Path) -> Option<String> {
  let content = fs::read_to_string(manifest_path).ok()?;
  let json: serde_json::Value = serde_json::from_str(&content).ok()?;
  json.as_object()?;

  Some(
    json
      .get("version")
      .and_then(|v| v.as_str())
      .unwrap_or("0.0.0")
      .to_string(),
  )
}

/// Compute the next version from the manifest
///
/// - "0.0.0" (or no version field) bootstraps to "1.0.0" regardless of the
///   bump flag
/// - otherwise the minor (resetting patch) or patch component is incremented
/// - an unreadable manifest or unparseable version falls back to a
///   `YYYY.MM.DD.HHmm` stamp
pub fn next_version(manifest_path: &Path, bump_minor: bool) -> String {
  match current_version(manifest_path) {
    Some(current) => bump(&current, bump_minor).unwrap_or_else(|| fallback_version(&Local::now())),
    None => fallback_version(&Local::now()),
  }
}

/// Bump a version string, tolerating truncated forms like "1.2"
///
/// Missing minor/patch components default to zero before incrementing.
/// Returns `None` when the string is not a version at all.
pub fn bump(current: &str, bump_minor: bool) -> Option<String> {
  if current == "0.0.0" {
    return Some("1.0.0".to_string());
  }

  let (major, minor, patch) = match Version::parse(current) {
    Ok(v) => (v.major, v.minor, v.patch),
    Err(_) => parse_lenient(current)?,
  };

  let next = if bump_minor {
    Version::new(major, minor + 1, 0)
  } else {
    Version::new(major, minor, patch + 1)
  };

  Some(next.to_string())
}

/// Persist a version into the manifest, preserving the pretty-printed shape
pub fn persist_version(manifest_path: &Path, version: &str) -> BackstopResult<()> {
  let content = fs::read_to_string(manifest_path)?;
  let mut json: serde_json::Value = serde_json::from_str(&content)?;

  let Some(object) = json.as_object_mut() else {
    return Err(BackstopError::message(format!(
      "Manifest is not a JSON object: {}",
      manifest_path.display()
    )));
  };

  object.insert(
    "version".to_string(),
    serde_json::Value::String(version.to_string()),
  );

  fs::write(manifest_path, format!("{}\n", serde_json::to_string_pretty(&json)?))?;
  Ok(())
}

/// Date-time fallback version: `YYYY.MM.DD.HHmm`
pub fn fallback_version(now: &DateTime<Local>) -> String {
  now.format("%Y.%m.%d.%H%M").to_string()
}

/// Lenient `X[.Y[.Z]]` parse; absent components default to zero
fn parse_lenient(version: &str) -> Option<(u64, u64, u64)> {
  let mut parts = version.split('.');

  let major = parts.next()?.trim().parse::<u64>().ok()?;
  let minor = match parts.next() {
    Some(p) => p.trim().parse::<u64>().ok()?,
    None => 0,
  };
  let patch = match parts.next() {
    Some(p) => p.trim().parse::<u64>().ok()?,
    None => 0,
  };

  if parts.next().is_some() {
    return None;
  }

  Some((major, minor, patch))
}
