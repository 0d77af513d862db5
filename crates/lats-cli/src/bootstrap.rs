use anyhow::Context;
use lats_config::LatsConfig;
use lats_supabase::SupabaseClient;

use crate::cli::GlobalFlags;

/// Load `.env`, then layered configuration.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<LatsConfig> {
    LatsConfig::load_with_dotenv(flags.config.as_deref()).context("failed to load configuration")
}

/// Build a client from validated credentials.
pub fn connect(config: &LatsConfig) -> anyhow::Result<SupabaseClient> {
    let supabase = config.require_supabase()?;
    if !supabase.uses_service_role() {
        tracing::warn!(
            "using the anon key; DDL usually needs SUPABASE_SERVICE_ROLE_KEY (or LATS_SUPABASE__SERVICE_ROLE_KEY)"
        );
    }
    let client = SupabaseClient::from_config(supabase).context("failed to build Supabase client")?;
    tracing::debug!(url = client.base_url(), "supabase client ready");
    Ok(client)
}
