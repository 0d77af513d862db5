use lats_core::{ProbeReport, RunReport, SplitFile};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};

/// Handle `latsdb schema`.
pub fn handle(args: &SchemaArgs, _flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::RunReport => schemars::schema_for!(RunReport),
        SchemaType::Split => schemars::schema_for!(Vec<SplitFile>),
        SchemaType::ProbeReport => schemars::schema_for!(Vec<ProbeReport>),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
