//! Report types returned by `latsdb run`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::execution::RunSummary;
use crate::probe::{ProbeReport, ProbeStatus};
use crate::statement::SkippedBlock;

/// Result for one migration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileReport {
    pub path: String,
    /// Statements the splitter emitted.
    pub statements: usize,
    pub skipped: Vec<SkippedBlock>,
    /// `None` for dry runs and for files never reached after an abort.
    pub summary: Option<RunSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Clean,
    CompletedWithErrors,
    Aborted,
    DryRun,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Totals {
    pub files: usize,
    pub statements: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub probes_present: usize,
    pub probes_missing: usize,
    pub probes_inconclusive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub outcome: RunOutcome,
    pub totals: Totals,
    pub files: Vec<FileReport>,
    pub probes: Vec<ProbeReport>,
}

impl RunReport {
    /// Assemble a report, deriving totals and the outcome from the parts.
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        dry_run: bool,
        files: Vec<FileReport>,
        probes: Vec<ProbeReport>,
    ) -> Self {
        let mut totals = Totals {
            files: files.len(),
            ..Totals::default()
        };
        let mut aborted = false;
        for file in &files {
            totals.statements += file.statements;
            totals.skipped += file.skipped.len();
            if let Some(summary) = &file.summary {
                totals.succeeded += summary.success_count;
                totals.failed += summary.error_count;
                aborted |= summary.aborted;
            }
        }
        for probe in &probes {
            match probe.status {
                ProbeStatus::Present => totals.probes_present += 1,
                ProbeStatus::Missing => totals.probes_missing += 1,
                ProbeStatus::Inconclusive => totals.probes_inconclusive += 1,
            }
        }

        let outcome = if dry_run {
            RunOutcome::DryRun
        } else if aborted {
            RunOutcome::Aborted
        } else if totals.failed > 0 {
            RunOutcome::CompletedWithErrors
        } else {
            RunOutcome::Clean
        };

        Self {
            started_at,
            finished_at,
            dry_run,
            outcome,
            totals,
            files,
            probes,
        }
    }

    /// Whether every statement succeeded and every probe found its object.
    #[must_use]
    pub fn is_strictly_clean(&self) -> bool {
        matches!(self.outcome, RunOutcome::Clean | RunOutcome::DryRun)
            && self.totals.probes_missing == 0
            && self.totals.probes_inconclusive == 0
    }
}
