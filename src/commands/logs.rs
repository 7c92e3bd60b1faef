//! Log viewer: print the backup log to stdout

use crate::core::config::Config;
use crate::core::error::BackstopResult;
use std::fs;

/// Print the backup log, optionally only the last `lines` entries
pub fn run_logs(config: &Config, tail: bool, lines: usize) -> BackstopResult<()> {
  let log_path = config.log_path();

  if !log_path.exists() {
    println!("ℹ️  No log file found. No backups have run yet.");
    return Ok(());
  }

  let content = fs::read_to_string(&log_path)?;
  let entries: Vec<&str> = content.lines().filter(|line| !line.trim().is_empty()).collect();

  let shown: &[&str] = if tail {
    &entries[entries.len().saturating_sub(lines)..]
  } else {
    &entries
  };

  if tail {
    println!("\n📋 Last {} log entries:\n", shown.len());
  } else {
    println!("\n📋 All backup logs ({} entries):\n", entries.len());
  }

  for line in shown {
    println!("{}", line);
  }

  println!("\n📁 Log file: {}", log_path.display());
  println!("📊 Total entries: {}\n", entries.len());

  Ok(())
}
