//! Supabase (PostgREST) HTTP client.

use std::time::Duration;

use lats_config::SupabaseConfig;
use lats_core::ident::QualifiedName;

use crate::SqlBackend;
use crate::error::BackendError;
use crate::http::check_response;

/// HTTP client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    exec_function: QualifiedName,
    sql_param: String,
}

impl SupabaseClient {
    /// Build a client from a validated config section.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidRequest`] if no key is configured or the
    /// procedure name is not a valid identifier, and [`BackendError::Http`] if
    /// the underlying `reqwest::Client` fails to build.
    pub fn from_config(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| BackendError::InvalidRequest("no Supabase API key configured".into()))?
            .to_string();
        let exec_function = QualifiedName::parse(&config.exec_function)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("latsdb/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_key,
            exec_function,
            sql_param: config.sql_param.trim().to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a remote procedure with a JSON body and return its JSON result
    /// (`Null` for `void` procedures).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails, the API answers with an
    /// error status, or the body is not JSON.
    pub async fn rpc(
        &self,
        function: &QualifiedName,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!(
            "{}/rest/v1/rpc/{}",
            self.base_url,
            urlencoding::encode(&function.name)
        );
        let mut request = self.authorized(self.http.post(&url)).json(body);
        if let Some(schema) = &function.schema {
            request = request.header("Content-Profile", schema);
        }

        tracing::debug!(%url, "rpc call");
        let resp = check_response(request.send().await?).await?;
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Parse(format!("rpc response: {e}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

impl SqlBackend for SupabaseClient {
    async fn exec_sql(&self, sql: &str) -> Result<(), BackendError> {
        let mut body = serde_json::Map::new();
        body.insert(
            self.sql_param.clone(),
            serde_json::Value::String(sql.to_string()),
        );
        self.rpc(&self.exec_function, &serde_json::Value::Object(body))
            .await?;
        Ok(())
    }

    async fn select(
        &self,
        table: &str,
        columns: &str,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, BackendError> {
        let table =
            QualifiedName::parse(table).map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        let url = format!(
            "{}/rest/v1/{}?select={}&limit={limit}",
            self.base_url,
            urlencoding::encode(&table.name),
            urlencoding::encode(columns)
        );
        let mut request = self.authorized(self.http.get(&url));
        if let Some(schema) = &table.schema {
            request = request.header("Accept-Profile", schema);
        }

        tracing::debug!(%url, "select probe");
        let resp = check_response(request.send().await?).await?;
        let text = resp.text().await?;
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Array(rows)) => Ok(rows),
            Ok(other) => Err(BackendError::Parse(format!(
                "expected a JSON array, got {other}"
            ))),
            Err(e) => Err(BackendError::Parse(format!("select response: {e}"))),
        }
    }

    fn exec_function(&self) -> &str {
        &self.exec_function.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://abcd.supabase.co/".into(),
            anon_key: "anon".into(),
            ..Default::default()
        }
    }

    #[test]
    fn from_config_trims_base_url() {
        let client = SupabaseClient::from_config(&config()).unwrap();
        assert_eq!(client.base_url(), "https://abcd.supabase.co");
        assert_eq!(client.exec_function(), "exec_sql");
    }

    #[test]
    fn from_config_requires_a_key() {
        let config = SupabaseConfig {
            anon_key: String::new(),
            ..config()
        };
        assert!(matches!(
            SupabaseClient::from_config(&config),
            Err(BackendError::InvalidRequest(_))
        ));
    }

    #[test]
    fn from_config_rejects_bad_function_name() {
        let config = SupabaseConfig {
            exec_function: "exec sql".into(),
            ..config()
        };
        assert!(SupabaseClient::from_config(&config).is_err());
    }

    #[test]
    fn schema_qualified_function_is_kept() {
        let config = SupabaseConfig {
            exec_function: "admin.exec_sql".into(),
            ..config()
        };
        let client = SupabaseClient::from_config(&config).unwrap();
        assert_eq!(client.exec_function(), "exec_sql");
        assert_eq!(client.exec_function.schema.as_deref(), Some("admin"));
    }
}
