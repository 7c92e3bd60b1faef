//! Command implementations behind the CLI surface

pub mod backup;
pub mod logs;
pub mod release;
pub mod setup;
pub mod watch;

pub use backup::{Trigger, run_backup};
pub use logs::run_logs;
pub use release::run_release;
pub use setup::run_setup;
pub use watch::run_watch;
