//! Integration tests for `backstop logs`

use crate::helpers::{TestWorkspace, backstop_ok};
use anyhow::Result;

#[test]
fn test_logs_without_log_file_is_friendly() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = backstop_ok(&ws.path, &["logs"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No log file found"));

  Ok(())
}

#[test]
fn test_logs_prints_entries_and_footer() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/feature.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  let output = backstop_ok(&ws.path, &["logs"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("All backup logs"));
  assert!(stdout.contains("[INFO] Backup run started"));
  assert!(stdout.contains("Log file:"));
  assert!(stdout.contains("Total entries:"));

  Ok(())
}

#[test]
fn test_logs_tail_limits_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/feature.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  let output = backstop_ok(&ws.path, &["logs", "--tail", "--lines", "2"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Last 2 log entries"));
  // The newest entry is the run-complete line
  assert!(stdout.contains("Backup run complete"));
  assert!(!stdout.contains("Backup run started"));

  Ok(())
}

#[test]
fn test_logs_tail_larger_than_log() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/feature.ts", "export {};\n")?;
  backstop_ok(&ws.path, &["backup"], &[])?;

  let output = backstop_ok(&ws.path, &["logs", "--tail", "--lines", "5000"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Backup run started"));

  Ok(())
}
