//! # lats-config
//!
//! Layered configuration loading for `latsdb` using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LATS_*` prefix, `__` as separator)
//! 2. Legacy application variables (`VITE_SUPABASE_URL`, `VITE_SUPABASE_ANON_KEY`,
//!    `SUPABASE_SERVICE_ROLE_KEY`) shared with the web frontend's `.env`
//! 3. An explicit `--config` file, or project-level `.lats/config.toml`
//! 4. User-level `~/.config/lats/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LATS_SUPABASE__URL` -> `supabase.url`,
//! `LATS_RUNNER__STOP_ON_ERROR` -> `runner.stop_on_error`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use lats_config::LatsConfig;
//!
//! let config = LatsConfig::load_with_dotenv(None).expect("config");
//! let supabase = config.require_supabase().expect("credentials");
//! println!("Supabase URL: {}", supabase.base_url());
//! ```

mod error;
mod runner;
mod supabase;

pub use error::ConfigError;
pub use runner::RunnerConfig;
pub use supabase::{SupabaseConfig, redact};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Legacy variable names and the config keys they feed.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("VITE_SUPABASE_URL", "supabase.url"),
    ("VITE_SUPABASE_ANON_KEY", "supabase.anon_key"),
    ("SUPABASE_SERVICE_ROLE_KEY", "supabase.service_role_key"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LatsConfig {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl LatsConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if an explicit config file does
    /// not exist, and [`ConfigError::Figment`] if a source cannot be read or a
    /// value has the wrong type.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path
            && !path.is_file()
        {
            return Err(ConfigError::InvalidValue {
                field: "config".into(),
                reason: format!("file '{}' does not exist", path.display()),
            });
        }
        Self::figment(config_path).extract().map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then all sources.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_path)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: explicit file, else project-local config
        match config_path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local_path = PathBuf::from(".lats/config.toml");
                if local_path.exists() {
                    figment = figment.merge(Toml::file(local_path));
                }
            }
        }

        // Layer 3: variables shared with the frontend
        figment = figment.merge(Self::legacy_env());

        // Layer 4: prefixed environment variables (highest priority)
        figment.merge(Env::prefixed("LATS_").split("__"))
    }

    /// Validated Supabase section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if credentials are missing or malformed.
    pub fn require_supabase(&self) -> Result<&SupabaseConfig, ConfigError> {
        self.supabase.validate()?;
        Ok(&self.supabase)
    }

    /// Copy with every secret masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            supabase: self.supabase.redacted(),
            runner: self.runner.clone(),
        }
    }

    fn legacy_env() -> Env {
        Env::raw().filter_map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(name, _)| key == *name)
                .map(|(_, path)| (*path).into())
        })
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lats").join("config.toml"))
    }
}
