//! Watch command: debounced auto-backup loop
//!
//! Runs until interrupted. Relevant file events keep pushing a single
//! debounce deadline out; once the tree has been quiet for the full delay,
//! one backup run fires. The shutdown flag is checked before a due deadline
//! may fire, so an interrupt never starts a partial backup.

use crate::commands::backup::{self, Trigger};
use crate::core::config::{Config, DEBOUNCE_DELAY};
use crate::core::error::BackstopResult;
use crate::core::vcs::SystemGit;
use crate::logger::Logger;
use crate::watcher::{BackupGate, Debouncer, FileWatcher, WatchBackend, kind_label, should_ignore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

/// Cap on one event-wait so the shutdown flag stays responsive
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Watch the project root until interrupted
pub fn run_watch(config: &Config) -> BackstopResult<()> {
  let logger = Logger::new(config);

  // Fail fast when not inside a repository
  SystemGit::open(&config.project_root)?;

  let watcher = FileWatcher::start(&config.project_root)?;
  let delay_secs = DEBOUNCE_DELAY.as_secs().to_string();
  match watcher.backend {
    WatchBackend::Native => {
      logger.info("Watch mode started", &[("backend", "native".to_string()), ("backupDelay", delay_secs)]);
    }
    WatchBackend::Poll => {
      logger.warn(
        "Watch mode started in polling fallback mode",
        &[("backend", "polling".to_string()), ("backupDelay", delay_secs)],
      );
    }
  }

  println!("👀 Watching for changes ({} backend)...", watcher.backend.label());
  println!(
    "⏱️  Backup runs automatically {} seconds after the last change",
    DEBOUNCE_DELAY.as_secs()
  );
  println!("Press Ctrl+C to stop\n");

  let shutdown = Arc::new(AtomicBool::new(false));
  {
    let shutdown = shutdown.clone();
    ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))?;
  }

  watch_loop(config, &logger, &watcher, &shutdown);

  logger.info("Backup watcher stopped", &[]);
  println!("\n🛑 Backup watcher stopped");
  Ok(())
}

fn watch_loop(config: &Config, logger: &Logger, watcher: &FileWatcher, shutdown: &AtomicBool) {
  let mut debouncer = Debouncer::new(DEBOUNCE_DELAY);
  let mut gate = BackupGate::new();

  loop {
    if shutdown.load(Ordering::SeqCst) {
      debouncer.clear();
      break;
    }

    let now = Instant::now();
    if debouncer.due(now) {
      debouncer.clear();

      if gate.try_acquire() {
        logger.info("Changes settled, starting backup...", &[]);
        if let Err(err) = backup::run_backup(config, Trigger::Watch) {
          logger.error("Backup run failed", Some(&err.to_string()));
        }
        gate.release();
      } else {
        logger.warn("Backup already in progress, dropping trigger", &[]);
      }
      continue;
    }

    let timeout = debouncer.remaining(now).map(|r| r.min(IDLE_POLL)).unwrap_or(IDLE_POLL);

    match watcher.recv_timeout(timeout) {
      Ok(Ok(event)) => {
        let Some(label) = kind_label(&event.kind) else {
          continue;
        };

        let paths: Vec<String> = event
          .paths
          .iter()
          .map(|path| {
            path
              .strip_prefix(&config.project_root)
              .unwrap_or(path)
              .display()
              .to_string()
          })
          .filter(|path| !should_ignore(path))
          .collect();

        if paths.is_empty() {
          continue;
        }

        for path in &paths {
          println!("📝 File {}: {}", label, path);
          logger.debug(
            &format!("File {}: {}", label, path),
            &[("path", path.clone()), ("type", label.to_string())],
          );
        }
        debouncer.note_event(Instant::now());
      }
      Ok(Err(err)) => {
        logger.warn(&format!("Watcher error: {}", err), &[]);
      }
      Err(RecvTimeoutError::Timeout) => {}
      Err(RecvTimeoutError::Disconnected) => break,
    }
  }
}
