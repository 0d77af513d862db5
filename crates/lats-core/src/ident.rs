//! SQL identifier validation for names that end up in URLs or generated SQL.

use crate::errors::CoreError;

/// A validated, optionally schema-qualified identifier such as `lats_brands`
/// or `public.exec_sql`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    /// Parse and validate `name` or `schema.name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if either part is empty or
    /// contains anything other than ASCII letters, digits and `_`, or starts
    /// with a digit.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let value = value.trim();
        let mut parts = value.split('.');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid(value, "at most one '.' is allowed"));
        }

        match second {
            Some(name) => {
                check_part(value, first)?;
                check_part(value, name)?;
                Ok(Self {
                    schema: Some(first.to_string()),
                    name: name.to_string(),
                })
            }
            None => {
                check_part(value, first)?;
                Ok(Self {
                    schema: None,
                    name: first.to_string(),
                })
            }
        }
    }

    /// Schema to use when none was given.
    #[must_use]
    pub fn schema_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Validate a bare (unqualified) identifier, e.g. a column name.
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] under the same rules as [`QualifiedName::parse`].
pub fn validate_identifier(value: &str) -> Result<(), CoreError> {
    check_part(value, value)
}

fn check_part(whole: &str, part: &str) -> Result<(), CoreError> {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return Err(invalid(whole, "identifier is empty"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid(whole, "must start with a letter or '_'"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(whole, "only letters, digits and '_' are allowed"));
    }
    Ok(())
}

fn invalid(value: &str, reason: &str) -> CoreError {
    CoreError::InvalidIdentifier {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
