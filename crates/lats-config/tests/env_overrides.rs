//! Environment variable precedence, including the frontend's `VITE_*` names.

use figment::Jail;
use lats_config::LatsConfig;
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn legacy_variables_fill_supabase_section() {
    Jail::expect_with(|jail| {
        jail.set_env("VITE_SUPABASE_URL", "https://legacy.supabase.co");
        jail.set_env("VITE_SUPABASE_ANON_KEY", "anon-legacy");
        jail.set_env("SUPABASE_SERVICE_ROLE_KEY", "service-legacy");

        let config = LatsConfig::load(None).expect("config loads");
        assert_eq!(config.supabase.url, "https://legacy.supabase.co");
        assert_eq!(config.supabase.anon_key, "anon-legacy");
        assert_eq!(config.supabase.service_role_key, "service-legacy");
        assert_eq!(config.supabase.api_key(), Some("service-legacy"));
        Ok(())
    });
}

#[test]
fn prefixed_variables_beat_legacy_ones() {
    Jail::expect_with(|jail| {
        jail.set_env("VITE_SUPABASE_URL", "https://legacy.supabase.co");
        jail.set_env("LATS_SUPABASE__URL", "https://prefixed.supabase.co");

        let config = LatsConfig::load(None).expect("config loads");
        assert_eq!(config.supabase.url, "https://prefixed.supabase.co");
        Ok(())
    });
}

#[test]
fn legacy_variables_beat_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            "[supabase]\nurl = \"https://toml.supabase.co\"\nanon_key = \"anon-toml\"\n",
        )?;
        jail.set_env("VITE_SUPABASE_ANON_KEY", "anon-env");

        let config = LatsConfig::load(Some(Path::new("config.toml"))).expect("config loads");
        assert_eq!(config.supabase.url, "https://toml.supabase.co");
        assert_eq!(config.supabase.anon_key, "anon-env");
        Ok(())
    });
}

#[test]
fn runner_settings_from_env() {
    Jail::expect_with(|jail| {
        jail.set_env("LATS_RUNNER__STOP_ON_ERROR", "true");
        jail.set_env("LATS_RUNNER__SPLIT_MODE", "quote-aware");

        let config = LatsConfig::load(None).expect("config loads");
        assert!(config.runner.stop_on_error);
        assert_eq!(config.runner.split_mode, lats_core::SplitMode::QuoteAware);
        Ok(())
    });
}

#[test]
fn unrelated_variables_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("VITE_APP_NAME", "LATS POS");
        let config = LatsConfig::load(None).expect("config loads");
        assert!(!config.supabase.is_configured());
        Ok(())
    });
}
