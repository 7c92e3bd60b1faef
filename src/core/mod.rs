//! Core building blocks for backstop
//!
//! - **config**: environment-driven runtime configuration
//! - **error**: error types with contextual help messages and exit codes
//! - **version**: next-version derivation from the project manifest
//! - **vcs**: version-control abstraction (`VersionControl` + `SystemGit`)

pub mod config;
pub mod error;
pub mod version;
pub mod vcs;
