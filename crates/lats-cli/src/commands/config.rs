use serde::Serialize;

use crate::bootstrap::load_config;
use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct ConfigResponse {
    #[serde(flatten)]
    config: lats_config::LatsConfig,
    configured: bool,
    key_role: &'static str,
}

/// Handle `latsdb config`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let supabase = &config.supabase;
    let key_role = if supabase.uses_service_role() {
        "service_role"
    } else if supabase.api_key().is_some() {
        "anon"
    } else {
        "none"
    };

    output(
        &ConfigResponse {
            configured: supabase.is_configured(),
            key_role,
            config: config.redacted(),
        },
        flags.format,
    )
}
