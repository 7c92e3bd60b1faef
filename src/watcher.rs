//! Debounced file-system watching
//!
//! A recursive watch over the project root feeds a single debounce deadline:
//! every relevant event pushes the deadline out, and only a full quiet
//! period triggers a backup. The native backend is preferred; environments
//! where it cannot start (network mounts, exotic kernels) fall back to a
//! polling watch with identical event filtering and debounce behavior.

use crate::core::error::BackstopResult;
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use std::time::{Duration, Instant};

/// Path fragments excluded from watching (substring match)
pub const IGNORE_PATTERNS: &[&str] = &[
  "node_modules",
  ".git",
  "dist",
  "build",
  ".next",
  ".DS_Store",
  ".log",
  ".vscode",
  ".idea",
  "target",
  "logs",
  "CHANGELOG.md",
];

/// Poll interval for the fallback backend
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Whether a path should be excluded from triggering backups
pub fn should_ignore(path: &str) -> bool {
  IGNORE_PATTERNS.iter().any(|pattern| path.contains(pattern))
}

/// Console/log label for an event kind; `None` means the event is irrelevant
pub fn kind_label(kind: &EventKind) -> Option<&'static str> {
  match kind {
    EventKind::Access(_) => None,
    EventKind::Create(_) => Some("added"),
    EventKind::Remove(_) => Some("removed"),
    EventKind::Modify(_) => Some("changed"),
    EventKind::Any | EventKind::Other => Some("changed"),
  }
}

/// Single-deadline debouncer
///
/// Every event resets the deadline to `now + delay`; the deadline is due
/// once the full delay elapses with no further events.
#[derive(Debug)]
pub struct Debouncer {
  delay: Duration,
  deadline: Option<Instant>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self { delay, deadline: None }
  }

  /// Register an event, pushing the deadline out
  pub fn note_event(&mut self, now: Instant) {
    self.deadline = Some(now + self.delay);
  }

  /// Whether the quiet period has fully elapsed
  pub fn due(&self, now: Instant) -> bool {
    self.deadline.is_some_and(|deadline| now >= deadline)
  }

  /// Time left until the deadline; `None` when no event is pending
  pub fn remaining(&self, now: Instant) -> Option<Duration> {
    self.deadline.map(|deadline| deadline.saturating_duration_since(now))
  }

  /// Drop any pending deadline
  pub fn clear(&mut self) {
    self.deadline = None;
  }

  /// Whether an event is pending
  #[allow(dead_code)] // Exercised in tests
  pub fn pending(&self) -> bool {
    self.deadline.is_some()
  }
}

/// Guard against overlapping backup runs
///
/// Owned by the watch loop, never global. `release` resets the flag
/// unconditionally, so a failed run can never wedge the guard.
#[derive(Debug, Default)]
pub struct BackupGate {
  busy: bool,
}

impl BackupGate {
  pub fn new() -> Self {
    Self::default()
  }

  /// Claim the gate; `false` means a run is already in flight
  pub fn try_acquire(&mut self) -> bool {
    if self.busy {
      return false;
    }
    self.busy = true;
    true
  }

  pub fn release(&mut self) {
    self.busy = false;
  }
}

/// Which watch strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchBackend {
  /// OS-native recursive watcher
  Native,
  /// Polling fallback
  Poll,
}

impl WatchBackend {
  pub fn label(self) -> &'static str {
    match self {
      WatchBackend::Native => "native",
      WatchBackend::Poll => "polling",
    }
  }
}

/// Running watch over a project root
pub struct FileWatcher {
  // Held for its Drop; dropping stops the underlying watch
  _watcher: Box<dyn Watcher>,
  pub backend: WatchBackend,
  rx: Receiver<notify::Result<Event>>,
}

impl FileWatcher {
  /// Start watching `root` recursively, preferring the native backend
  pub fn start(root: &Path) -> BackstopResult<Self> {
    let (tx, rx) = channel::<notify::Result<Event>>();

    match start_native(root, tx.clone()) {
      Ok(watcher) => Ok(Self {
        _watcher: Box::new(watcher),
        backend: WatchBackend::Native,
        rx,
      }),
      Err(_) => {
        let mut watcher = PollWatcher::new(tx, NotifyConfig::default().with_poll_interval(POLL_INTERVAL))?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
          _watcher: Box::new(watcher),
          backend: WatchBackend::Poll,
          rx,
        })
      }
    }
  }

  /// Wait up to `timeout` for the next raw event
  pub fn recv_timeout(&self, timeout: Duration) -> Result<notify::Result<Event>, std::sync::mpsc::RecvTimeoutError> {
    self.rx.recv_timeout(timeout)
  }
}

fn start_native(root: &Path, tx: std::sync::mpsc::Sender<notify::Result<Event>>) -> notify::Result<RecommendedWatcher> {
  let mut watcher = RecommendedWatcher::new(tx, NotifyConfig::default())?;
  watcher.watch(root, RecursiveMode::Recursive)?;
  Ok(watcher)
}
