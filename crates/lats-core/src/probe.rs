//! Verification probe targets and results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::ident::{QualifiedName, validate_identifier};

/// A schema object whose presence a probe checks after a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeTarget {
    Table { name: String },
    Columns { table: String, columns: Vec<String> },
    Function { name: String },
}

impl ProbeTarget {
    /// Validate every identifier the target carries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] for the first invalid name.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Table { name } | Self::Function { name } => {
                QualifiedName::parse(name)?;
            }
            Self::Columns { table, columns } => {
                QualifiedName::parse(table)?;
                if columns.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "column probe on '{table}' names no columns"
                    )));
                }
                for column in columns {
                    validate_identifier(column)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for ProbeTarget {
    type Err = CoreError;

    /// Parse `table`, `table:col1,col2` or `fn:name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoreError::InvalidProbeTarget(s.to_string()));
        }

        let target = if let Some(name) = s.strip_prefix("fn:") {
            Self::Function {
                name: name.trim().to_string(),
            }
        } else if let Some((table, cols)) = s.split_once(':') {
            let columns: Vec<String> = cols
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            if columns.is_empty() {
                return Err(CoreError::InvalidProbeTarget(s.to_string()));
            }
            Self::Columns {
                table: table.trim().to_string(),
                columns,
            }
        } else {
            Self::Table {
                name: s.to_string(),
            }
        };

        target.validate()?;
        Ok(target)
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { name } => write!(f, "table {name}"),
            Self::Columns { table, columns } => write!(f, "columns {table}({})", columns.join(",")),
            Self::Function { name } => write!(f, "function {name}"),
        }
    }
}

/// What a probe concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The object answered a read query.
    Present,
    /// The backend said the object does not exist.
    Missing,
    /// The probe could not decide (network, auth, server error, bad input).
    Inconclusive,
}

impl ProbeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Missing => "missing",
            Self::Inconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProbeReport {
    pub target: ProbeTarget,
    pub status: ProbeStatus,
    pub detail: Option<String>,
    pub rows_seen: usize,
}

impl ProbeReport {
    #[must_use]
    pub const fn present(target: ProbeTarget, rows_seen: usize) -> Self {
        Self {
            target,
            status: ProbeStatus::Present,
            detail: None,
            rows_seen,
        }
    }

    #[must_use]
    pub fn missing(target: ProbeTarget, detail: impl Into<String>) -> Self {
        Self {
            target,
            status: ProbeStatus::Missing,
            detail: Some(detail.into()),
            rows_seen: 0,
        }
    }

    #[must_use]
    pub fn inconclusive(target: ProbeTarget, detail: impl Into<String>) -> Self {
        Self {
            target,
            status: ProbeStatus::Inconclusive,
            detail: Some(detail.into()),
            rows_seen: 0,
        }
    }
}
