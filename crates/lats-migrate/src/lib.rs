//! # lats-migrate
//!
//! The migration pipeline:
//!
//! - [`splitter`]: SQL text → ordered statements.
//! - [`executor`]: sends statements one at a time and records each outcome.
//! - [`probe`]: post-migration existence checks for tables, columns and functions.
//! - [`files`]: resolves migration paths and directories.
//! - [`runner`]: ties the above together into a [`lats_core::RunReport`].

pub mod error;
pub mod executor;
pub mod files;
pub mod probe;
pub mod runner;
pub mod splitter;

pub use error::MigrateError;
pub use executor::{ExecOptions, Executor};
pub use files::{MigrationFile, collect_migrations};
pub use probe::{probe, probe_all};
pub use runner::{RunEvent, RunOptions, plan, run_migrations};
pub use splitter::split;
