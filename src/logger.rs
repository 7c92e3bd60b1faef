//! Structured, append-only backup log with console mirroring
//!
//! Every entry goes to `logs/backup.log` as one line:
//! `[timestamp] [LEVEL] message | key: value, key: value`. INFO, SUCCESS,
//! WARN and ERROR are mirrored to the console with distinct markers; DEBUG
//! stays file-only unless the debug flag is set. A failed file append must
//! never abort the run the logger is observing.

use crate::core::config::Config;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Success,
  Warn,
  Error,
  Debug,
}

impl Level {
  /// Tag written into the log file
  pub fn as_str(self) -> &'static str {
    match self {
      Level::Info => "INFO",
      Level::Success => "SUCCESS",
      Level::Warn => "WARN",
      Level::Error => "ERROR",
      Level::Debug => "DEBUG",
    }
  }
}

/// Per-project backup logger
pub struct Logger {
  log_path: PathBuf,
  debug_console: bool,
}

impl Logger {
  /// Create a logger for the configured project
  pub fn new(config: &Config) -> Self {
    Self {
      log_path: config.log_path(),
      debug_console: config.debug,
    }
  }

  pub fn info(&self, message: &str, payload: &[(&str, String)]) {
    self.write(Level::Info, message, payload);
    println!("ℹ️  {}", message);
  }

  pub fn success(&self, message: &str, payload: &[(&str, String)]) {
    self.write(Level::Success, message, payload);
    println!("✅ {}", message);
  }

  pub fn warn(&self, message: &str, payload: &[(&str, String)]) {
    self.write(Level::Warn, message, payload);
    eprintln!("⚠️  {}", message);
  }

  pub fn error(&self, message: &str, detail: Option<&str>) {
    let payload: Vec<(&str, String)> = detail.map(|d| ("error", d.to_string())).into_iter().collect();
    self.write(Level::Error, message, &payload);
    eprintln!("❌ {}", message);
    if let Some(detail) = detail {
      eprintln!("{}", detail);
    }
  }

  pub fn debug(&self, message: &str, payload: &[(&str, String)]) {
    self.write(Level::Debug, message, payload);
    if self.debug_console {
      println!("🔍 [DEBUG] {}", message);
    }
  }

  fn write(&self, level: Level, message: &str, payload: &[(&str, String)]) {
    let timestamp = Local::now().format("%d-%m-%Y %H:%M:%S").to_string();
    let entry = format_entry(&timestamp, level, message, payload);

    if let Some(dir) = self.log_path.parent() {
      let _ = fs::create_dir_all(dir);
    }
    let _ = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.log_path)
      .and_then(|mut file| writeln!(file, "{}", entry));
  }
}

/// Format one log line: `[timestamp] [LEVEL] message | key: value, ...`
fn format_entry(timestamp: &str, level: Level, message: &str, payload: &[(&str, String)]) -> String {
  let mut entry = format!("[{}] [{}] {}", timestamp, level.as_str(), message);

  if !payload.is_empty() {
    let data: Vec<String> = payload.iter().map(|(key, value)| format!("{}: {}", key, value)).collect();
    entry.push_str(&format!(" | {}", data.join(", ")));
  }

  entry
}
