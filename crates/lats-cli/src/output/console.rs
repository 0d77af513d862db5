//! Console layouts for `text` and `table` output.

use lats_core::statement::preview;
use lats_core::{
    ExecutionResult, ProbeReport, ProbeStatus, RunOutcome, RunReport, SkippedBlock, SplitOutput,
};

use super::table::{TableOptions, render_table};

pub fn file_header(name: &str, split: &SplitOutput) -> String {
    let mut line = format!("📄 {name}: {} statement(s)", split.statements.len());
    if !split.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", split.skipped.len()));
    }
    line
}

pub fn skipped_line(block: &SkippedBlock, preview_chars: usize) -> String {
    format!(
        "⏭️  line {}: {} not executed: {}",
        block.line,
        block.reason,
        preview(&block.text, preview_chars)
    )
}

pub fn statement_line(result: &ExecutionResult, of: usize, preview_chars: usize) -> String {
    let sql = preview(&result.statement, preview_chars);
    match &result.error_message {
        None => format!(
            "✅ [{}/{of}] {sql} ({} ms)",
            result.ordinal, result.elapsed_ms
        ),
        Some(error) => format!("❌ [{}/{of}] {sql}\n   error: {error}", result.ordinal),
    }
}

pub fn probe_line(report: &ProbeReport) -> String {
    let icon = match report.status {
        ProbeStatus::Present => "✅",
        ProbeStatus::Missing => "❌",
        ProbeStatus::Inconclusive => "❓",
    };
    match &report.detail {
        Some(detail) => format!("{icon} {} {}: {detail}", report.target, report.status),
        None => format!(
            "{icon} {} {} ({} row(s) read)",
            report.target, report.status, report.rows_seen
        ),
    }
}

/// Closing block of a run: counts, probes and the outcome line.
pub fn run_summary(report: &RunReport) -> String {
    let totals = &report.totals;
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
    let mut lines = vec![
        String::new(),
        "📊 Summary".to_string(),
        format!(
            "   files: {}  statements: {}  succeeded: {}  failed: {}  skipped: {}  ({elapsed_ms} ms)",
            totals.files, totals.statements, totals.succeeded, totals.failed, totals.skipped
        ),
    ];

    if !report.probes.is_empty() {
        lines.push("🔍 Verification".to_string());
        for probe in &report.probes {
            lines.push(format!("   {}", probe_line(probe)));
        }
    }

    lines.push(
        match report.outcome {
            RunOutcome::Clean => "🎉 Migration completed successfully!",
            RunOutcome::CompletedWithErrors => "⚠️  Migration completed with some errors",
            RunOutcome::Aborted => "🛑 Migration stopped at the first error",
            RunOutcome::DryRun => "📝 Dry run: nothing was executed",
        }
        .to_string(),
    );
    lines.join("\n")
}

/// Statement listing for `latsdb split`.
pub fn split_listing(name: &str, split: &SplitOutput) -> String {
    let mut out = vec![format!("-- {}", file_header(name, split))];
    for statement in &split.statements {
        out.push(format!(
            "-- [{}] line {}\n{}",
            statement.ordinal,
            statement.line,
            terminated(&statement.sql)
        ));
    }
    for block in &split.skipped {
        out.push(format!("-- skipped ({}) at line {}", block.reason, block.line));
    }
    out.join("\n")
}

/// Append `;`, on its own line when the last line may end in a `--` comment.
fn terminated(sql: &str) -> String {
    if sql.lines().last().is_some_and(|line| line.contains("--")) {
        format!("{sql}\n;")
    } else {
        format!("{sql};")
    }
}

pub fn run_table(report: &RunReport, preview_chars: usize, options: TableOptions) -> String {
    let mut rows = Vec::new();
    for file in &report.files {
        let name = short_name(&file.path);
        match &file.summary {
            Some(summary) => {
                for result in &summary.results {
                    rows.push(vec![
                        name.clone(),
                        result.ordinal.to_string(),
                        if result.success { "ok" } else { "failed" }.to_string(),
                        result.elapsed_ms.to_string(),
                        result.error_message.clone().map_or_else(
                            || preview(&result.statement, preview_chars),
                            |e| preview(&e, preview_chars),
                        ),
                    ]);
                }
            }
            None => rows.push(vec![
                name.clone(),
                "-".to_string(),
                "not_run".to_string(),
                "-".to_string(),
                format!("{} statement(s)", file.statements),
            ]),
        }
        for block in &file.skipped {
            rows.push(vec![
                name.clone(),
                format!("L{}", block.line),
                "skipped".to_string(),
                "-".to_string(),
                block.reason.to_string(),
            ]);
        }
    }

    let mut out = render_table(
        &["file", "#", "status", "ms", "statement / error"],
        &rows,
        options,
    );
    if !report.probes.is_empty() {
        out.push_str("\n\n");
        out.push_str(&probe_table(&report.probes, options));
    }
    out
}

pub fn probe_table(probes: &[ProbeReport], options: TableOptions) -> String {
    let rows = probes
        .iter()
        .map(|probe| {
            vec![
                probe.target.to_string(),
                probe.status.to_string(),
                probe.rows_seen.to_string(),
                probe.detail.clone().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["target", "status", "rows", "detail"], &rows, options)
}

pub fn split_table(
    files: &[(String, SplitOutput)],
    preview_chars: usize,
    options: TableOptions,
) -> String {
    let mut rows = Vec::new();
    for (name, split) in files {
        for statement in &split.statements {
            rows.push(vec![
                name.clone(),
                statement.ordinal.to_string(),
                statement.line.to_string(),
                "statement".to_string(),
                statement.preview(preview_chars),
            ]);
        }
        for block in &split.skipped {
            rows.push(vec![
                name.clone(),
                "-".to_string(),
                block.line.to_string(),
                "skipped".to_string(),
                format!("{}: {}", block.reason, preview(&block.text, preview_chars)),
            ]);
        }
    }
    render_table(&["file", "#", "line", "kind", "text"], &rows, options)
}

fn short_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lats_core::{FileReport, ProbeTarget, RunSummary, SkipReason, Statement};
    use pretty_assertions::assert_eq;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    fn stmt(ordinal: usize, sql: &str) -> Statement {
        Statement {
            ordinal,
            line: ordinal,
            sql: sql.to_string(),
        }
    }

    fn report() -> RunReport {
        let summary: RunSummary = [
            ExecutionResult::succeeded(&stmt(1, "CREATE TABLE IF NOT EXISTS t (id int)"), 12),
            ExecutionResult::failed(
                &stmt(2, "INSERT INTO u VALUES (1)"),
                "API error (400, 42P01): relation \"u\" does not exist",
                3,
            ),
        ]
        .into_iter()
        .collect();
        let file = FileReport {
            path: "migrations/001_init.sql".into(),
            statements: 2,
            skipped: vec![SkippedBlock {
                line: 9,
                reason: SkipReason::TransactionControl,
                text: "COMMIT".into(),
            }],
            summary: Some(summary),
        };
        let probes = vec![
            ProbeReport::present(ProbeTarget::Table { name: "t".into() }, 0),
            ProbeReport::missing(
                ProbeTarget::Table { name: "u".into() },
                "API error (404, PGRST205): Could not find the table",
            ),
        ];
        let now = Utc::now();
        RunReport::new(now, now, false, vec![file], probes)
    }

    #[test]
    fn statement_lines() {
        let ok = ExecutionResult::succeeded(&stmt(1, "SELECT\n  1"), 7);
        assert_eq!(statement_line(&ok, 3, 160), "✅ [1/3] SELECT 1 (7 ms)");

        let failed = ExecutionResult::failed(&stmt(2, "SELEC 1"), "syntax error", 1);
        assert_eq!(
            statement_line(&failed, 3, 160),
            "❌ [2/3] SELEC 1\n   error: syntax error"
        );
    }

    #[test]
    fn probe_lines() {
        let present = ProbeReport::present(ProbeTarget::Table { name: "t".into() }, 1);
        assert_eq!(probe_line(&present), "✅ table t present (1 row(s) read)");
        let missing = ProbeReport::missing(ProbeTarget::Function { name: "f".into() }, "gone");
        assert_eq!(probe_line(&missing), "❌ function f missing: gone");
    }

    #[test]
    fn summary_reports_errors() {
        let text = run_summary(&report());
        assert!(text.contains("statements: 2  succeeded: 1  failed: 1  skipped: 1"));
        assert!(text.contains("🔍 Verification"));
        assert!(text.ends_with("⚠️  Migration completed with some errors"));
    }

    #[test]
    fn run_table_lists_results_skips_and_probes() {
        let table = run_table(&report(), 160, PLAIN);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("file"));
        assert!(lines[2].contains("001_init.sql") && lines[2].contains("ok"));
        assert!(lines[3].contains("failed") && lines[3].contains("42P01"));
        assert!(lines[4].contains("skipped") && lines[4].contains("transaction_control"));
        assert!(table.contains("table u"));
    }

    #[test]
    fn split_listing_is_runnable_sql() {
        let split = SplitOutput {
            statements: vec![stmt(1, "SELECT 1")],
            skipped: vec![SkippedBlock {
                line: 3,
                reason: SkipReason::ProceduralBlock,
                text: "DO $$ BEGIN END $$".into(),
            }],
        };
        assert_eq!(
            split_listing("a.sql", &split),
            "-- 📄 a.sql: 1 statement(s), 1 skipped\n-- [1] line 1\nSELECT 1;\n-- skipped (procedural_block) at line 3"
        );
    }

    #[test]
    fn split_listing_keeps_terminator_out_of_trailing_comment() {
        let split = SplitOutput {
            statements: vec![stmt(1, "SELECT 1 -- trailing"), stmt(2, "SELECT 2")],
            skipped: Vec::new(),
        };
        let listing = split_listing("a.sql", &split);
        assert!(listing.contains("SELECT 1 -- trailing\n;\n-- [2] line 2\nSELECT 2;"));
    }
}
