//! Sequential statement executor.

use std::time::Instant;

use lats_core::{ExecutionResult, RunSummary, Statement};
use lats_supabase::SqlBackend;

use crate::error::MigrateError;

/// Statement used by [`Executor::preflight`].
const PREFLIGHT_SQL: &str = "SELECT 1";

/// Executor behaviour.
#[derive(Debug, Clone, Copy)]
pub struct ExecOptions {
    /// Stop at the first failed statement instead of continuing.
    pub stop_on_error: bool,
    /// Characters of statement text shown in log lines.
    pub preview_chars: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            stop_on_error: false,
            preview_chars: 160,
        }
    }
}

/// Sends statements to a backend one at a time, in order.
///
/// There is no transaction around the statements and nothing is retried or
/// rolled back. Re-running a migration is safe only if its SQL is guarded
/// (`IF NOT EXISTS`, `OR REPLACE`).
pub struct Executor<'a, B> {
    backend: &'a B,
    options: ExecOptions,
}

impl<'a, B: SqlBackend> Executor<'a, B> {
    pub const fn new(backend: &'a B, options: ExecOptions) -> Self {
        Self { backend, options }
    }

    /// Check that the SQL-execution procedure answers before running anything.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::MissingRpc`] if the backend reports the procedure
    /// as absent and [`MigrateError::Backend`] for any other failure.
    pub async fn preflight(&self) -> Result<(), MigrateError> {
        match self.backend.exec_sql(PREFLIGHT_SQL).await {
            Ok(()) => {
                tracing::debug!(function = self.backend.exec_function(), "preflight ok");
                Ok(())
            }
            Err(e) if e.is_missing_rpc(self.backend.exec_function()) => {
                Err(MigrateError::MissingRpc {
                    function: self.backend.exec_function().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Execute `statements` in order, calling `on_result` after each one.
    ///
    /// A failed statement is logged and recorded; the run continues unless
    /// `stop_on_error` is set, in which case the summary is marked aborted.
    pub async fn execute(
        &self,
        statements: &[Statement],
        mut on_result: impl FnMut(&ExecutionResult),
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for statement in statements {
            let started = Instant::now();
            let outcome = self.backend.exec_sql(&statement.sql).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let result = match outcome {
                Ok(()) => {
                    tracing::info!(
                        ordinal = statement.ordinal,
                        line = statement.line,
                        elapsed_ms,
                        sql = %statement.preview(self.options.preview_chars),
                        "statement succeeded"
                    );
                    ExecutionResult::succeeded(statement, elapsed_ms)
                }
                Err(e) => {
                    tracing::warn!(
                        ordinal = statement.ordinal,
                        line = statement.line,
                        elapsed_ms,
                        sql = %statement.preview(self.options.preview_chars),
                        error = %e,
                        "statement failed"
                    );
                    ExecutionResult::failed(statement, e.summary(), elapsed_ms)
                }
            };

            on_result(&result);
            let failed = !result.success;
            summary.push(result);

            if failed && self.options.stop_on_error {
                summary.aborted = true;
                tracing::warn!(
                    ordinal = statement.ordinal,
                    remaining = statements.len() - summary.total(),
                    "stopping after first failure"
                );
                break;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lats_supabase::BackendError;
    use lats_supabase::memory::MemoryBackend;
    use pretty_assertions::assert_eq;

    fn statements(sqls: &[&str]) -> Vec<Statement> {
        sqls.iter()
            .enumerate()
            .map(|(i, sql)| Statement {
                ordinal: i + 1,
                line: i + 1,
                sql: (*sql).to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn runs_every_statement_in_order() {
        let db = MemoryBackend::new();
        let stmts = statements(&[
            "CREATE TABLE IF NOT EXISTS t (id int)",
            "INSERT INTO t VALUES (1)",
        ]);

        let summary = Executor::new(&db, ExecOptions::default())
            .execute(&stmts, |_| {})
            .await;

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 0);
        assert!(!summary.aborted);
        assert_eq!(
            db.executed(),
            vec!["CREATE TABLE IF NOT EXISTS t (id int)", "INSERT INTO t VALUES (1)"]
        );
    }

    #[tokio::test]
    async fn failure_does_not_stop_the_run() {
        let db = MemoryBackend::new();
        let stmts = statements(&[
            "INSERT INTO missing VALUES (1)",
            "CREATE TABLE a (id int)",
            "SELEC 1",
        ]);

        let mut seen = Vec::new();
        let summary = Executor::new(&db, ExecOptions::default())
            .execute(&stmts, |r| seen.push((r.ordinal, r.success)))
            .await;

        assert_eq!(seen, vec![(1, false), (2, true), (3, false)]);
        assert_eq!(summary.success_count + summary.error_count, stmts.len());
        assert_eq!(summary.error_count, 2);
        let first = &summary.results[0];
        assert!(first.error_message.as_deref().is_some_and(|m| m.contains("42P01")));
    }

    #[tokio::test]
    async fn stop_on_error_aborts() {
        let db = MemoryBackend::new();
        let stmts = statements(&["SELEC 1", "CREATE TABLE a (id int)"]);
        let options = ExecOptions {
            stop_on_error: true,
            ..ExecOptions::default()
        };

        let summary = Executor::new(&db, options).execute(&stmts, |_| {}).await;

        assert!(summary.aborted);
        assert_eq!(summary.results.len(), 1);
        assert!(!db.has_table("a"));
    }

    #[tokio::test]
    async fn empty_statement_list() {
        let db = MemoryBackend::new();
        let summary = Executor::new(&db, ExecOptions::default())
            .execute(&[], |_| {})
            .await;
        assert_eq!(summary, RunSummary::default());
        assert!(db.executed().is_empty());
    }

    #[tokio::test]
    async fn preflight_detects_missing_rpc() {
        let db = MemoryBackend::new().fail_on(
            PREFLIGHT_SQL,
            BackendError::api(
                404,
                Some("PGRST202"),
                "Could not find the function public.exec_sql(sql) in the schema cache",
            ),
        );
        let err = Executor::new(&db, ExecOptions::default())
            .preflight()
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::MissingRpc { ref function } if function == "exec_sql"));
    }

    #[tokio::test]
    async fn preflight_passes_other_errors_through() {
        let db = MemoryBackend::new().fail_on(
            PREFLIGHT_SQL,
            BackendError::api(401, None, "Invalid API key"),
        );
        let err = Executor::new(&db, ExecOptions::default())
            .preflight()
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::Backend(ref e) if e.is_auth()));
    }

    #[tokio::test]
    async fn preflight_ok() {
        let db = MemoryBackend::new();
        assert!(Executor::new(&db, ExecOptions::default()).preflight().await.is_ok());
    }
}
