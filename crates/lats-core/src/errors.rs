//! Cross-cutting error types.
//!
//! Crate-specific errors (`ConfigError`, `BackendError`, `MigrateError`) live
//! in their own crates. `latsdb` converges them into `anyhow::Error`.

use thiserror::Error;

/// Errors that can be raised by any `lats-*` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A SQL identifier (table, column, function) failed validation.
    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// A probe target string could not be parsed.
    #[error("Invalid probe target '{0}' (expected 'table', 'table:col1,col2' or 'fn:name')")]
    InvalidProbeTarget(String),

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}
