//! Integration tests for `backstop backup`

use crate::helpers::{TestWorkspace, backstop, backstop_ok};
use anyhow::Result;

#[test]
fn test_backup_commits_and_pushes_changes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/feature.ts", "export const feature = true;\n")?;

  let before = ws.commit_count()?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  assert_eq!(ws.commit_count()?, before + 1);
  assert!(ws.last_commit_message()?.starts_with("Auto backup: "));

  // The commit reached the remote
  assert_eq!(ws.remote_commit_count()?, before + 1);

  // Log and change log were written
  assert!(ws.file_exists("logs/backup.log"));
  let log = ws.read_file("logs/backup.log")?;
  assert!(log.contains("[INFO] Backup run started"));
  assert!(log.contains("[SUCCESS] Backup run complete"));

  let changelog = ws.read_file("CHANGELOG.md")?;
  assert!(changelog.contains("## Commit Overview"));
  assert!(changelog.contains("## Commit History"));
  assert!(changelog.contains("## Backup Logs"));

  Ok(())
}

#[test]
fn test_backup_on_clean_tree_is_a_noop() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let before = ws.commit_count()?;
  let output = backstop_ok(&ws.path, &["backup"], &[])?;

  assert_eq!(ws.commit_count()?, before);
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("No changes to back up"));

  let log = ws.read_file("logs/backup.log")?;
  assert!(log.contains("[INFO] No changes to back up"));
  assert!(!log.contains("[ERROR]"));

  Ok(())
}

#[test]
fn test_backup_without_remote_warns_but_succeeds() -> Result<()> {
  let ws = TestWorkspace::without_remote()?;
  ws.write_file("src/feature.ts", "export const feature = true;\n")?;

  let output = backstop(&ws.path, &["backup"], &[])?;

  // Both push attempts fail, but the run itself succeeds
  assert!(output.status.success());
  assert!(ws.last_commit_message()?.starts_with("Auto backup: "));

  let log = ws.read_file("logs/backup.log")?;
  assert!(log.contains("[WARN]"));
  assert!(log.contains("the commit remains local"));

  Ok(())
}

#[test]
fn test_backup_tags_when_many_files_change() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.set_manifest_version("2.3.1")?;
  ws.write_file("src/index.ts", "export const hello = 'updated';\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  for i in 0..12 {
    ws.write_file(&format!("src/module{}.ts", i), "export {};\n")?;
  }

  backstop_ok(&ws.path, &["backup"], &[])?;

  // 12 changed files exceed the threshold of 10: patch-bump tag, no flags
  assert!(ws.tags()?.contains(&"v2.3.2".to_string()));
  assert!(ws.remote_tags()?.contains(&"v2.3.2".to_string()));

  // Without CREATE_RELEASE the manifest is left alone
  assert!(ws.read_file("package.json")?.contains("\"version\": \"2.3.1\""));

  Ok(())
}

#[test]
fn test_backup_below_threshold_does_not_tag() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/one.ts", "export {};\n")?;
  ws.write_file("src/two.ts", "export {};\n")?;

  backstop_ok(&ws.path, &["backup"], &[])?;

  assert!(ws.tags()?.is_empty());

  Ok(())
}

#[test]
fn test_backup_with_auto_tag_env_tags_small_runs() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.set_manifest_version("1.0.0")?;
  ws.write_file("src/index.ts", "export const hello = 'updated';\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  ws.write_file("src/small.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[("AUTO_TAG", "true")])?;

  assert!(ws.tags()?.contains(&"v1.0.1".to_string()));
  // AUTO_TAG alone never touches the manifest
  assert!(ws.read_file("package.json")?.contains("\"version\": \"1.0.0\""));

  Ok(())
}

#[test]
fn test_backup_with_create_release_env_bumps_and_persists() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.set_manifest_version("2.3.1")?;
  ws.write_file("src/index.ts", "export const hello = 'updated';\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  ws.write_file("src/feature.ts", "export const feature = true;\n")?;
  backstop_ok(&ws.path, &["backup"], &[("CREATE_RELEASE", "true")])?;

  // Force-release bumps the minor component and persists it
  assert!(ws.tags()?.contains(&"v2.4.0".to_string()));
  assert!(ws.read_file("package.json")?.contains("\"version\": \"2.4.0\""));
  assert_eq!(ws.last_commit_message()?, "Bump version to 2.4.0");

  Ok(())
}

#[test]
fn test_second_backup_keeps_changelog_regions_unique() -> Result<()> {
  let ws = TestWorkspace::new()?;

  ws.write_file("src/one.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  ws.write_file("src/two.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  let changelog = ws.read_file("CHANGELOG.md")?;
  assert_eq!(changelog.matches("## Backup Logs").count(), 1);
  assert_eq!(changelog.matches("| Hash | Author | Date | Message |").count(), 1);
  // Two runs, two event entries
  assert_eq!(changelog.matches("- **").count(), 2);

  Ok(())
}

#[test]
fn test_tag_is_not_recreated_on_collision() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.set_manifest_version("1.0.0")?;
  ws.write_file("src/index.ts", "export const hello = 'updated';\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  ws.write_file("src/one.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[("AUTO_TAG", "true")])?;
  assert!(ws.tags()?.contains(&"v1.0.1".to_string()));

  // Manifest still says 1.0.0, so the next auto-tag computes v1.0.1 again
  ws.write_file("src/two.ts", "export {};\n")?;
  let output = backstop(&ws.path, &["backup"], &[("AUTO_TAG", "true")])?;

  assert!(output.status.success());
  let log = ws.read_file("logs/backup.log")?;
  assert!(log.contains("Tag v1.0.1 already exists, skipping"));
  assert_eq!(ws.tags()?.iter().filter(|t| *t == &"v1.0.1".to_string()).count(), 1);

  Ok(())
}
