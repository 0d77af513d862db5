use lats_supabase::bootstrap::exec_sql_function_ddl;
use serde::Serialize;

use crate::bootstrap::load_config;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

#[derive(Serialize)]
struct BootstrapSqlResponse {
    function: String,
    sql: String,
}

/// Handle `latsdb bootstrap-sql`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let supabase = &config.supabase;
    let sql = exec_sql_function_ddl(&supabase.exec_function, &supabase.sql_param)?;

    match flags.format {
        OutputFormat::Text | OutputFormat::Table => {
            println!("-- Apply once in the Supabase SQL editor.");
            print!("{sql}");
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Raw => output(
            &BootstrapSqlResponse {
                function: supabase.exec_function.clone(),
                sql,
            },
            flags.format,
        ),
    }
}
