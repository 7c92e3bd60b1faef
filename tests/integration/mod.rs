//! Integration tests driving the backstop binary against throwaway git
//! repositories with file-based bare remotes

mod helpers;
mod test_backup;
mod test_logs;
mod test_setup;
mod test_workflow;
