//! End-to-end workflow: repeated backups followed by a release

use crate::helpers::{TestWorkspace, backstop_ok};
use anyhow::Result;

#[test]
fn test_backup_backup_release_cycle() -> Result<()> {
  let ws = TestWorkspace::new()?;

  // First backup
  ws.write_file("src/feature.ts", "export const feature = 1;\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  // Second backup sweeps new work plus the changelog from the first run
  ws.write_file("src/feature.ts", "export const feature = 2;\n")?;
  ws.write_file("src/other.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  // Everything reached the remote
  assert_eq!(ws.commit_count()?, ws.remote_commit_count()?);

  // Release on top of the backed-up history
  backstop_ok(&ws.path, &["release"], &[])?;

  assert!(ws.tags()?.contains(&"v1.3.0".to_string()));
  assert!(ws.remote_tags()?.contains(&"v1.3.0".to_string()));
  assert!(ws.read_file("package.json")?.contains("\"version\": \"1.3.0\""));

  // The log tells the whole story in order
  let log = ws.read_file("logs/backup.log")?;
  let started = log.find("[INFO] Backup run started");
  let release_started = log.find("[INFO] Release creation started");
  assert!(started.is_some());
  assert!(release_started.is_some());
  assert!(started < release_started);

  // The changelog accumulated one event per backup run
  let changelog = ws.read_file("CHANGELOG.md")?;
  assert_eq!(changelog.matches("- **").count(), 2);
  assert_eq!(changelog.matches("## Backup Logs").count(), 1);

  Ok(())
}

#[test]
fn test_hook_triggered_backup_records_provenance() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/feature.ts", "export {};\n")?;

  backstop_ok(&ws.path, &["backup", "--trigger", "hook"], &[])?;

  let log = ws.read_file("logs/backup.log")?;
  assert!(log.contains("trigger: hook"));

  Ok(())
}
