use lats_core::ProbeStatus;
use lats_migrate::probe_all;

use crate::bootstrap::{connect, load_config};
use crate::cli::root_commands::ProbeArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::parse_targets;
use crate::output::{console, output, table_options};
use crate::progress::Progress;

/// Handle `latsdb probe`.
pub async fn handle(args: &ProbeArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let targets = parse_targets(&args.targets)?;
    let config = load_config(flags)?;
    let client = connect(&config)?;

    let spinner = Progress::spinner(&format!("probing {} target(s)", targets.len()));
    let reports = probe_all(&client, &targets).await;
    spinner.finish_clear();

    match flags.format {
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", console::probe_line(report));
            }
        }
        OutputFormat::Table => println!("{}", console::probe_table(&reports, table_options())),
        OutputFormat::Json | OutputFormat::Raw => output(&reports, flags.format)?,
    }

    let not_present = reports
        .iter()
        .filter(|r| r.status != ProbeStatus::Present)
        .count();
    if args.strict && not_present > 0 {
        anyhow::bail!("{not_present} of {} probe(s) not present", reports.len());
    }
    Ok(())
}
