//! Supabase project configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_exec_function() -> String {
    "exec_sql".to_string()
}

fn default_sql_param() -> String {
    "sql".to_string()
}

/// Default HTTP timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., `https://abcd1234.supabase.co`).
    #[serde(default)]
    pub url: String,

    /// Public anon key. Enough for probes, usually not for DDL.
    #[serde(default)]
    pub anon_key: String,

    /// Service-role key. Preferred over the anon key when set.
    #[serde(default)]
    pub service_role_key: String,

    /// Name of the remote procedure that executes one SQL string.
    #[serde(default = "default_exec_function")]
    pub exec_function: String,

    /// Name of the procedure's text parameter.
    #[serde(default = "default_sql_param")]
    pub sql_param: String,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            service_role_key: String::new(),
            exec_function: default_exec_function(),
            sql_param: default_sql_param(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SupabaseConfig {
    /// Check if the URL and at least one key are present.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && self.api_key().is_some()
    }

    /// The key sent as `apikey` and bearer token: service role first, then anon.
    pub fn api_key(&self) -> Option<&str> {
        [&self.service_role_key, &self.anon_key]
            .into_iter()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
    }

    pub fn uses_service_role(&self) -> bool {
        !self.service_role_key.trim().is_empty()
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }

    /// Check the section is complete and well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when the URL or both keys are
    /// missing, and [`ConfigError::InvalidValue`] for a non-HTTP URL, a zero
    /// timeout or an empty procedure name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "supabase".into(),
                hint: "set VITE_SUPABASE_URL or LATS_SUPABASE__URL".into(),
            });
        }
        if self.api_key().is_none() {
            return Err(ConfigError::NotConfigured {
                section: "supabase".into(),
                hint: "set SUPABASE_SERVICE_ROLE_KEY or VITE_SUPABASE_ANON_KEY".into(),
            });
        }
        let url = self.base_url();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "supabase.url".into(),
                reason: format!("expected an http(s) URL, got '{url}'"),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "supabase.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.exec_function.trim().is_empty() || self.sql_param.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "supabase.exec_function".into(),
                reason: "procedure and parameter names must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Copy with both keys masked, safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            anon_key: redact(&self.anon_key),
            service_role_key: redact(&self.service_role_key),
            ..self.clone()
        }
    }
}

/// Mask a secret, keeping only its first four characters.
#[must_use]
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{head}****")
}
