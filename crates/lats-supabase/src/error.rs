//! Backend error types.

use thiserror::Error;

/// SQLSTATE and PostgREST codes meaning "the object you asked about does not exist".
const MISSING_OBJECT_CODES: &[&str] = &[
    "42P01",    // undefined_table
    "42703",    // undefined_column
    "42883",    // undefined_function
    "3F000",    // invalid_schema_name
    "PGRST200", // relationship not found
    "PGRST202", // function not found in schema cache
    "PGRST204", // column not found in schema cache
    "PGRST205", // table not found in schema cache
];

/// Errors that can occur when talking to the Supabase REST API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport error (connect, timeout, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error(
        "API error ({status}{}): {message}",
        .code.as_deref().map(|c| format!(", {c}")).unwrap_or_default()
    )]
    Api {
        /// HTTP status code.
        status: u16,
        /// PostgREST or SQLSTATE code, when the body carried one.
        code: Option<String>,
        /// Error message or raw response body.
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request was refused before it was sent (e.g. an invalid identifier).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Shorthand for an API error without details or hint.
    #[must_use]
    pub fn api(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.map(String::from),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidRequest(_) => None,
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend reported that a table, column, schema or function does not exist.
    #[must_use]
    pub fn is_missing_object(&self) -> bool {
        let Self::Api {
            status,
            code,
            message,
            ..
        } = self
        else {
            return false;
        };
        if *status == 404 {
            return true;
        }
        if code
            .as_deref()
            .is_some_and(|c| MISSING_OBJECT_CODES.contains(&c))
        {
            return true;
        }
        let message = message.to_ascii_lowercase();
        message.contains("does not exist") || message.contains("could not find")
    }

    /// Whether the SQL-execution procedure itself is not installed.
    ///
    /// PostgREST reports an unknown RPC as `PGRST202`. Servers that predate
    /// error codes answer 404 with a message naming `function(args)`; a
    /// SQLSTATE raised inside the procedure (42883 is also a 404) never counts.
    #[must_use]
    pub fn is_missing_rpc(&self, function: &str) -> bool {
        match self {
            Self::Api {
                status,
                code,
                message,
                ..
            } => match code.as_deref() {
                Some(code) => code == "PGRST202",
                None => *status == 404 && message.contains(&format!("{function}(")),
            },
            _ => false,
        }
    }

    /// Whether the key was rejected or lacks the needed role.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// One-line message suitable for console output, with the hint appended.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Api {
                hint: Some(hint), ..
            } if !hint.is_empty() => format!("{self} (hint: {hint})"),
            _ => self.to_string(),
        }
    }
}
