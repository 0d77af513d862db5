use lats_core::{RunOutcome, RunReport, SplitMode};
use lats_migrate::{
    ExecOptions, Executor, MigrateError, RunEvent, RunOptions, collect_migrations, plan,
    run_migrations, split,
};
use lats_supabase::SqlBackend;

use crate::bootstrap::{connect, load_config};
use crate::cli::root_commands::RunArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::parse_targets;
use crate::output::{console, output, table_options};
use crate::progress::Progress;

/// Handle `latsdb run`.
pub async fn handle(args: &RunArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let targets = parse_targets(&args.verify)?;
    let files = collect_migrations(&args.paths)?;

    let options = RunOptions {
        mode: args.mode.map_or(config.runner.split_mode, SplitMode::from),
        exec: ExecOptions {
            stop_on_error: args.stop_on_error || config.runner.stop_on_error,
            preview_chars: config.runner.preview_chars,
        },
        dry_run: args.dry_run,
    };
    let preview_chars = options.exec.preview_chars;
    let text = flags.format == OutputFormat::Text && !flags.quiet;

    tracing::info!(
        files = files.len(),
        mode = %options.mode,
        stop_on_error = options.exec.stop_on_error,
        dry_run = options.dry_run,
        "starting migration run"
    );

    let report = if options.dry_run {
        // Nothing is sent, so credentials are not required.
        plan(&files, options.mode, |event| {
            if text {
                print_event(&event, preview_chars, None);
            }
        })
    } else {
        let client = connect(&config)?;
        preflight(&client, &options).await?;

        let total: usize = files
            .iter()
            .map(|file| split(&file.sql, options.mode).statements.len())
            .sum();
        let progress = Progress::bar(
            u64::try_from(total).unwrap_or(u64::MAX),
            "running migrations",
        );
        let report = run_migrations(&client, &files, &targets, &options, |event| {
            if let RunEvent::Statement { file, .. } = &event {
                progress.inc(1);
                progress.set_message(&file.name());
            }
            if text {
                print_event(&event, preview_chars, Some(&progress));
            }
        })
        .await;
        if report.outcome == RunOutcome::Clean {
            progress.finish_clear();
        } else {
            progress.finish_err("finished with errors");
        }
        report
    };

    render_report(&report, flags, preview_chars)?;

    if args.strict && !report.is_strictly_clean() {
        anyhow::bail!(
            "strict mode: {} failed statement(s), {} probe(s) not present",
            report.totals.failed,
            report.totals.probes_missing + report.totals.probes_inconclusive
        );
    }
    Ok(())
}

async fn preflight<B: SqlBackend>(backend: &B, options: &RunOptions) -> anyhow::Result<()> {
    let spinner = Progress::spinner("checking the SQL execution function");
    let result = Executor::new(backend, options.exec).preflight().await;
    spinner.finish_clear();
    match result {
        Ok(()) => Ok(()),
        Err(error @ MigrateError::MissingRpc { .. }) => Err(error.into()),
        Err(error) => Err(anyhow::Error::new(error).context("preflight call failed")),
    }
}

fn print_event(event: &RunEvent<'_>, preview_chars: usize, progress: Option<&Progress>) {
    let lines = match event {
        RunEvent::FileStarted { file, split } => {
            let mut lines = vec![console::file_header(&file.name(), split)];
            lines.extend(
                split
                    .skipped
                    .iter()
                    .map(|block| console::skipped_line(block, preview_chars)),
            );
            lines
        }
        RunEvent::Statement { result, of, .. } => {
            vec![console::statement_line(result, *of, preview_chars)]
        }
        RunEvent::Planned { file, split } => {
            vec![console::split_listing(&file.name(), split), String::new()]
        }
        RunEvent::FileSkipped { file } => {
            vec![format!("⏭️  {}: not executed after abort", file.name())]
        }
    };
    for line in lines {
        match progress {
            Some(progress) => progress.println(&line),
            None => println!("{line}"),
        }
    }
}

fn render_report(
    report: &RunReport,
    flags: &GlobalFlags,
    preview_chars: usize,
) -> anyhow::Result<()> {
    match flags.format {
        OutputFormat::Text => {
            if !flags.quiet {
                println!("{}", console::run_summary(report));
            }
            Ok(())
        }
        OutputFormat::Table => {
            println!(
                "{}",
                console::run_table(report, preview_chars, table_options())
            );
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Raw => output(report, flags.format),
    }
}
