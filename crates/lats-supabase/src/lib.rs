//! # lats-supabase
//!
//! The backend seam for the migration runner and its Supabase implementation.
//!
//! - [`SqlBackend`]: the two operations the runner needs (execute one SQL
//!   string, read a few rows from a table).
//! - [`SupabaseClient`]: PostgREST over HTTP. SQL goes through a remote
//!   procedure (`exec_sql` by default) that `EXECUTE`s its text argument.
//! - [`bootstrap`]: DDL that installs that procedure.
//! - `memory` (feature `test-support`): an in-process fake for tests.

pub mod bootstrap;
mod client;
mod error;
mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use client::SupabaseClient;
pub use error::BackendError;

use std::future::Future;

/// Operations the runner performs against the database.
///
/// Calls are awaited one at a time by the runner; implementations need not
/// support concurrent use.
pub trait SqlBackend {
    /// Execute one SQL statement. The result set, if any, is discarded.
    fn exec_sql(&self, sql: &str) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Read at most `limit` rows of `columns` (a comma-separated list or `*`)
    /// from `table`, which may be schema-qualified.
    fn select(
        &self,
        table: &str,
        columns: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, BackendError>> + Send;

    /// Name of the SQL-execution procedure, for error classification.
    fn exec_function(&self) -> &str;
}
