//! Migration error types.

use std::path::PathBuf;

use lats_supabase::BackendError;
use thiserror::Error;

/// Errors that stop a run before any statement is sent.
///
/// Failures of individual statements are not errors; they are recorded in
/// [`lats_core::ExecutionResult`].
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A migration path could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory was given that contains no `.sql` files.
    #[error("no SQL migration files found in {}", path.display())]
    NoMigrations { path: PathBuf },

    /// The SQL-execution procedure is not installed on the backend.
    #[error(
        "SQL function '{function}' is not installed; run `latsdb bootstrap-sql` and apply its output in the SQL editor"
    )]
    MissingRpc { function: String },

    /// The backend rejected the preflight call for another reason.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
