//! Shared HTTP response helpers.
//!
//! Centralizes the non-success → [`BackendError::Api`] mapping, including
//! parsing of the PostgREST error body (`code`, `message`, `details`, `hint`),
//! so the client methods stay focused on request construction.

use serde::Deserialize;

use crate::error::BackendError;

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<serde_json::Value>,
    hint: Option<serde_json::Value>,
}

/// Check an HTTP response for an error status.
///
/// Returns the response unchanged on success. Otherwise reads the body and
/// returns [`BackendError::Api`], using the PostgREST error fields when the
/// body is one and the raw text when it is not.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

/// Build an API error from a status code and raw body.
pub fn api_error(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(parsed) if parsed.message.is_some() || parsed.code.is_some() => BackendError::Api {
            status,
            code: parsed.code,
            message: parsed.message.unwrap_or_default(),
            details: parsed.details.and_then(value_to_text),
            hint: parsed.hint.and_then(value_to_text),
        },
        _ => BackendError::Api {
            status,
            code: None,
            message: if body.trim().is_empty() {
                format!("HTTP {status} with empty body")
            } else {
                body.trim().to_string()
            },
            details: None,
            hint: None,
        },
    }
}

fn value_to_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
