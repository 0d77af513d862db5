//! # lats-core
//!
//! Core types and error types for the LATS migration runner.
//!
//! This crate provides the foundational types shared across all `lats-*` crates:
//! - SQL statements and the blocks the splitter refuses to emit
//! - Per-statement execution results and the aggregated run summary
//! - Verification probe targets, statuses and reports
//! - The run report rendered by `latsdb`
//! - SQL identifier validation
//! - Cross-cutting error types

pub mod errors;
pub mod execution;
pub mod ident;
pub mod probe;
pub mod report;
pub mod statement;

pub use errors::CoreError;
pub use execution::{ExecutionResult, RunSummary};
pub use probe::{ProbeReport, ProbeStatus, ProbeTarget};
pub use report::{FileReport, RunOutcome, RunReport, Totals};
pub use statement::{SkipReason, SkippedBlock, SplitFile, SplitMode, SplitOutput, Statement};
