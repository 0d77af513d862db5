//! Per-statement execution results and the aggregated run summary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::statement::Statement;

/// Outcome of submitting one statement to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionResult {
    pub ordinal: usize,
    pub statement: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    #[must_use]
    pub fn succeeded(statement: &Statement, elapsed_ms: u64) -> Self {
        Self {
            ordinal: statement.ordinal,
            statement: statement.sql.clone(),
            success: true,
            error_message: None,
            elapsed_ms,
        }
    }

    #[must_use]
    pub fn failed(
        statement: &Statement,
        error_message: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            ordinal: statement.ordinal,
            statement: statement.sql.clone(),
            success: false,
            error_message: Some(error_message.into()),
            elapsed_ms,
        }
    }
}

/// Aggregate of one sequential run.
///
/// `success_count + error_count` always equals `results.len()`. When the run
/// was not aborted, `results.len()` equals the number of statements submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub results: Vec<ExecutionResult>,
    pub success_count: usize,
    pub error_count: usize,
    /// The run stopped early because `stop_on_error` was set.
    pub aborted: bool,
}

impl RunSummary {
    /// Record one result, keeping the counters in step.
    pub fn push(&mut self, result: ExecutionResult) {
        if result.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
        self.results.push(result);
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.success_count + self.error_count
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.error_count == 0 && !self.aborted
    }

    /// Failed results, in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

impl FromIterator<ExecutionResult> for RunSummary {
    fn from_iter<I: IntoIterator<Item = ExecutionResult>>(iter: I) -> Self {
        let mut summary = Self::default();
        for result in iter {
            summary.push(result);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stmt(ordinal: usize, sql: &str) -> Statement {
        Statement {
            ordinal,
            line: ordinal,
            sql: sql.into(),
        }
    }

    #[test]
    fn counters_track_results() {
        let summary: RunSummary = [
            ExecutionResult::succeeded(&stmt(1, "CREATE TABLE a (id int)"), 3),
            ExecutionResult::failed(
                &stmt(2, "ALTER TABLE b ADD c int"),
                "relation \"b\" does not exist",
                5,
            ),
            ExecutionResult::succeeded(&stmt(3, "SELECT 1"), 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.total(), summary.results.len());
        assert!(!summary.is_clean());
        let failed: Vec<usize> = summary.failures().map(|r| r.ordinal).collect();
        assert_eq!(failed, vec![2]);
    }

    #[test]
    fn empty_summary_is_clean() {
        let summary = RunSummary::default();
        assert!(summary.is_clean());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn aborted_summary_is_not_clean() {
        let summary = RunSummary {
            aborted: true,
            ..RunSummary::default()
        };
        assert!(!summary.is_clean());
    }
}
