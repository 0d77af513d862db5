use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::cli::global::ModeArg;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Split and execute migration files, then run verification probes.
    Run(RunArgs),
    /// Show how migration files split into statements without executing them.
    Split(SplitArgs),
    /// Check that tables, columns or functions exist.
    Probe(ProbeArgs),
    /// Print the effective configuration with secrets masked.
    Config,
    /// Print the SQL that installs the statement-execution function.
    BootstrapSql,
    /// Print the JSON Schema of a machine-readable output.
    Schema(SchemaArgs),
}

/// Arguments for `latsdb run`.
#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Migration files or directories of `.sql` files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Statement splitting strategy (defaults to `runner.split_mode`).
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Stop at the first failing statement.
    #[arg(long)]
    pub stop_on_error: bool,
    /// Probe to run afterwards: `table`, `table:col1,col2` or `fn:name`. Repeatable.
    #[arg(long = "verify", value_name = "TARGET")]
    pub verify: Vec<String>,
    /// Split and report without contacting the database.
    #[arg(long)]
    pub dry_run: bool,
    /// Exit non-zero if any statement fails or any probe is not present.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `latsdb split`.
#[derive(Clone, Debug, Args)]
pub struct SplitArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for `latsdb probe`.
#[derive(Clone, Debug, Args)]
pub struct ProbeArgs {
    /// `table`, `table:col1,col2` or `fn:name`.
    #[arg(required = true)]
    pub targets: Vec<String>,
    /// Exit non-zero unless every target is present.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `latsdb schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "run-report")]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    /// `latsdb run --format json`
    RunReport,
    /// `latsdb split --format json`
    Split,
    /// `latsdb probe --format json`
    ProbeReport,
}
