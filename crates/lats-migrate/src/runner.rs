//! Whole-run orchestration: split and execute each file, then probe.

use chrono::Utc;
use lats_core::{
    ExecutionResult, FileReport, ProbeTarget, RunReport, RunSummary, SplitMode, SplitOutput,
};
use lats_supabase::SqlBackend;

use crate::executor::{ExecOptions, Executor};
use crate::files::MigrationFile;
use crate::probe::probe_all;
use crate::splitter::split;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub mode: SplitMode,
    pub exec: ExecOptions,
    /// Split only; send nothing to the backend.
    pub dry_run: bool,
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum RunEvent<'a> {
    FileStarted {
        file: &'a MigrationFile,
        split: &'a SplitOutput,
    },
    Statement {
        file: &'a MigrationFile,
        result: &'a ExecutionResult,
        of: usize,
    },
    /// Not executed because an earlier file aborted the run.
    FileSkipped {
        file: &'a MigrationFile,
    },
    /// Dry run: what would have been executed.
    Planned {
        file: &'a MigrationFile,
        split: &'a SplitOutput,
    },
}

/// Run `files` in order against `backend`, then probe `targets`.
///
/// Files after an aborted one are split (for the report) but not executed.
/// With `dry_run` set this is [`plan`] and the backend is never called.
pub async fn run_migrations<B: SqlBackend>(
    backend: &B,
    files: &[MigrationFile],
    targets: &[ProbeTarget],
    options: &RunOptions,
    mut on_event: impl FnMut(RunEvent<'_>),
) -> RunReport {
    if options.dry_run {
        return plan(files, options.mode, on_event);
    }

    let started_at = Utc::now();
    let executor = Executor::new(backend, options.exec);
    let mut reports = Vec::with_capacity(files.len());
    let mut aborted = false;

    for file in files {
        let output = split_logged(file, options.mode);

        let summary = if aborted {
            on_event(RunEvent::FileSkipped { file });
            None
        } else {
            on_event(RunEvent::FileStarted {
                file,
                split: &output,
            });
            let of = output.statements.len();
            let summary = executor
                .execute(&output.statements, |result| {
                    on_event(RunEvent::Statement { file, result, of });
                })
                .await;
            aborted = summary.aborted;
            Some(summary)
        };

        reports.push(file_report(file, output, summary));
    }

    let probes = probe_all(backend, targets).await;
    RunReport::new(started_at, Utc::now(), false, reports, probes)
}

/// Split every file and report what would run, without a backend.
pub fn plan(
    files: &[MigrationFile],
    mode: SplitMode,
    mut on_event: impl FnMut(RunEvent<'_>),
) -> RunReport {
    let started_at = Utc::now();
    let reports = files
        .iter()
        .map(|file| {
            let output = split_logged(file, mode);
            on_event(RunEvent::Planned {
                file,
                split: &output,
            });
            file_report(file, output, None)
        })
        .collect();
    RunReport::new(started_at, Utc::now(), true, reports, Vec::new())
}

fn split_logged(file: &MigrationFile, mode: SplitMode) -> SplitOutput {
    let output = split(&file.sql, mode);
    tracing::info!(
        file = %file.path.display(),
        statements = output.statements.len(),
        skipped = output.skipped.len(),
        %mode,
        "split migration"
    );
    for block in &output.skipped {
        tracing::warn!(
            file = %file.path.display(),
            line = block.line,
            reason = %block.reason,
            "block not executed"
        );
    }
    output
}

fn file_report(
    file: &MigrationFile,
    output: SplitOutput,
    summary: Option<RunSummary>,
) -> FileReport {
    FileReport {
        path: file.path.display().to_string(),
        statements: output.statements.len(),
        skipped: output.skipped,
        summary,
    }
}
