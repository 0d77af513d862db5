use lats_core::{SplitFile, SplitMode};
use lats_migrate::{collect_migrations, split};

use crate::bootstrap::load_config;
use crate::cli::root_commands::SplitArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::{console, output, table_options};

/// Handle `latsdb split`.
pub fn handle(args: &SplitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let mode = args.mode.map_or(config.runner.split_mode, SplitMode::from);
    let files = collect_migrations(&args.paths)?;

    let splits = files
        .iter()
        .map(|file| {
            let path = file.path.display().to_string();
            (file.name(), path, split(&file.sql, mode))
        })
        .collect::<Vec<_>>();

    match flags.format {
        OutputFormat::Text => {
            for (name, _, output) in &splits {
                println!("{}\n", console::split_listing(name, output));
            }
            Ok(())
        }
        OutputFormat::Table => {
            let named = splits
                .into_iter()
                .map(|(name, _, output)| (name, output))
                .collect::<Vec<_>>();
            println!(
                "{}",
                console::split_table(&named, config.runner.preview_chars, table_options())
            );
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Raw => {
            let response = splits
                .into_iter()
                .map(|(_, path, output)| SplitFile { path, mode, output })
                .collect::<Vec<_>>();
            output(&response, flags.format)
        }
    }
}
