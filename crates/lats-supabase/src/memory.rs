//! In-process backend for tests.
//!
//! Understands just enough SQL to model schema changes: `CREATE TABLE`,
//! `ALTER TABLE … ADD COLUMN`, `DROP TABLE`, `INSERT INTO`, `CREATE FUNCTION`
//! and the function-existence check issued by the verification probe. Other
//! statements starting with a known keyword succeed without effect; anything
//! else is a syntax error. Errors carry the SQLSTATE / PostgREST codes the
//! real backend would return.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::SqlBackend;
use crate::error::BackendError;

const KNOWN_KEYWORDS: &[&str] = &[
    "SELECT", "CREATE", "ALTER", "DROP", "INSERT", "UPDATE", "DELETE", "GRANT", "REVOKE",
    "COMMENT", "DO", "WITH", "NOTIFY", "TRUNCATE",
];

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Table>,
    functions: BTreeSet<String>,
    executed: Vec<String>,
    fail_on: Vec<(String, BackendError)>,
}

#[derive(Debug, Default, Clone)]
struct Table {
    columns: Vec<String>,
    rows: usize,
}

/// Thread-safe in-memory database stand-in.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a table with the given columns.
    #[must_use]
    pub fn with_table(self, name: &str, columns: &[&str]) -> Self {
        self.lock().tables.insert(
            name.to_ascii_lowercase(),
            Table {
                columns: columns.iter().map(|c| c.to_ascii_lowercase()).collect(),
                rows: 0,
            },
        );
        self
    }

    /// Pre-create a function.
    #[must_use]
    pub fn with_function(self, name: &str) -> Self {
        self.lock().functions.insert(name.to_ascii_lowercase());
        self
    }

    /// Make every statement containing `needle` fail with `error`.
    #[must_use]
    pub fn fail_on(self, needle: &str, error: BackendError) -> Self {
        self.lock().fail_on.push((needle.to_string(), error));
        self
    }

    /// Statements received by `exec_sql`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.lock().tables.contains_key(&name.to_ascii_lowercase())
    }

    pub fn row_count(&self, name: &str) -> Option<usize> {
        self.lock()
            .tables
            .get(&name.to_ascii_lowercase())
            .map(|t| t.rows)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn apply(&self, sql: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.executed.push(sql.to_string());

        if let Some((_, error)) = state.fail_on.iter().find(|(needle, _)| sql.contains(needle)) {
            return Err(clone_error(error));
        }

        let words: Vec<String> = sql
            .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_uppercase)
            .collect();
        let raw: Vec<&str> = sql
            .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .filter(|w| !w.is_empty())
            .collect();
        let word = |i: usize| words.get(i).map_or("", String::as_str);
        let ident = |i: usize| {
            raw.get(i)
                .map(|w| unqualify(w).to_ascii_lowercase())
                .unwrap_or_default()
        };

        if sql.contains("pg_proc") {
            return check_function_probe(&state, sql);
        }

        match (word(0), word(1)) {
            ("CREATE", "TABLE") => {
                let (if_not_exists, at) = skip_phrase(&words, 2, &["IF", "NOT", "EXISTS"]);
                let name = ident(at);
                if state.tables.contains_key(&name) {
                    if if_not_exists {
                        return Ok(());
                    }
                    return Err(BackendError::api(
                        400,
                        Some("42P07"),
                        format!("relation \"{name}\" already exists"),
                    ));
                }
                let columns = parse_columns(sql);
                state.tables.insert(name, Table { columns, rows: 0 });
                Ok(())
            }
            ("ALTER", "TABLE") => {
                let (if_exists, at) = skip_phrase(&words, 2, &["IF", "EXISTS"]);
                let name = ident(at);
                let Some(table) = state.tables.get_mut(&name) else {
                    if if_exists {
                        return Ok(());
                    }
                    return Err(undefined_table(&name));
                };
                if word(at + 1) == "ADD" {
                    let mut i = at + 2;
                    if word(i) == "COLUMN" {
                        i += 1;
                    }
                    let (if_not_exists, i) = skip_phrase(&words, i, &["IF", "NOT", "EXISTS"]);
                    let column = ident(i);
                    if table.columns.contains(&column) {
                        if if_not_exists {
                            return Ok(());
                        }
                        return Err(BackendError::api(
                            400,
                            Some("42701"),
                            format!("column \"{column}\" of relation \"{name}\" already exists"),
                        ));
                    }
                    table.columns.push(column);
                }
                Ok(())
            }
            ("DROP", "TABLE") => {
                let (if_exists, at) = skip_phrase(&words, 2, &["IF", "EXISTS"]);
                let name = ident(at);
                if state.tables.remove(&name).is_none() && !if_exists {
                    return Err(undefined_table(&name));
                }
                Ok(())
            }
            ("INSERT", "INTO") => {
                let name = ident(2);
                let table = state
                    .tables
                    .get_mut(&name)
                    .ok_or_else(|| undefined_table(&name))?;
                table.rows += 1;
                Ok(())
            }
            ("CREATE", "FUNCTION") | ("CREATE", "OR") => {
                let at = if word(1) == "OR" { 4 } else { 2 };
                let name = ident(at);
                state.functions.insert(name);
                Ok(())
            }
            (first, _) if KNOWN_KEYWORDS.contains(&first) => Ok(()),
            (first, _) => Err(BackendError::api(
                400,
                Some("42601"),
                format!("syntax error at or near \"{first}\""),
            )),
        }
    }
}

impl SqlBackend for MemoryBackend {
    async fn exec_sql(&self, sql: &str) -> Result<(), BackendError> {
        self.apply(sql)
    }

    async fn select(
        &self,
        table: &str,
        columns: &str,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, BackendError> {
        let state = self.lock();
        let name = unqualify(table).to_ascii_lowercase();
        let Some(found) = state.tables.get(&name) else {
            return Err(BackendError::api(
                404,
                Some("PGRST205"),
                format!("Could not find the table 'public.{name}' in the schema cache"),
            ));
        };
        if columns != "*" {
            for column in columns.split(',').map(str::trim) {
                if !found.columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                    return Err(BackendError::api(
                        400,
                        Some("42703"),
                        format!("column {name}.{column} does not exist"),
                    ));
                }
            }
        }
        let take = found.rows.min(limit as usize);
        Ok((0..take).map(|i| serde_json::json!({ "row": i })).collect())
    }

    fn exec_function(&self) -> &str {
        "exec_sql"
    }
}

fn check_function_probe(state: &State, sql: &str) -> Result<(), BackendError> {
    let name = sql
        .split("proname = '")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if state.functions.contains(&name) {
        Ok(())
    } else {
        // PostgREST maps undefined_function to 404.
        Err(BackendError::api(
            404,
            Some("42883"),
            format!("function {name} does not exist"),
        ))
    }
}

/// If `phrase` appears at `words[at..]`, return `(true, index after it)`.
fn skip_phrase(words: &[String], at: usize, phrase: &[&str]) -> (bool, usize) {
    let matches = phrase
        .iter()
        .enumerate()
        .all(|(i, p)| words.get(at + i).is_some_and(|w| w == p));
    if matches {
        (true, at + phrase.len())
    } else {
        (false, at)
    }
}

fn unqualify(name: &str) -> &str {
    let name = name.trim_matches('"');
    name.rsplit('.').next().unwrap_or(name).trim_matches('"')
}

fn parse_columns(sql: &str) -> Vec<String> {
    let Some(open) = sql.find('(') else {
        return Vec::new();
    };
    let Some(close) = sql.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in sql[open + 1..close].chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                columns.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    columns.push(current);

    columns
        .iter()
        .filter_map(|def| def.split_whitespace().next())
        .map(|w| w.trim_matches('"').to_ascii_lowercase())
        .filter(|w| {
            !matches!(
                w.to_ascii_uppercase().as_str(),
                "CONSTRAINT" | "PRIMARY" | "UNIQUE" | "FOREIGN" | "CHECK" | "EXCLUDE"
            )
        })
        .collect()
}

fn undefined_table(name: &str) -> BackendError {
    BackendError::api(
        400,
        Some("42P01"),
        format!("relation \"{name}\" does not exist"),
    )
}

fn clone_error(error: &BackendError) -> BackendError {
    match error {
        BackendError::Api {
            status,
            code,
            message,
            details,
            hint,
        } => BackendError::Api {
            status: *status,
            code: code.clone(),
            message: message.clone(),
            details: details.clone(),
            hint: hint.clone(),
        },
        BackendError::Parse(m) => BackendError::Parse(m.clone()),
        BackendError::InvalidRequest(m) => BackendError::InvalidRequest(m.clone()),
        BackendError::Http(e) => BackendError::InvalidRequest(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_table_then_select() {
        let db = MemoryBackend::new();
        db.exec_sql(
            "CREATE TABLE IF NOT EXISTS t (id int PRIMARY KEY, name text, CONSTRAINT t_name UNIQUE (name))",
        )
        .await
        .unwrap();
        db.exec_sql("INSERT INTO t VALUES (1, 'a')").await.unwrap();
        let rows = db.select("t", "id,name", 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(db.select("t", "constraint", 1).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_create_without_guard_fails() {
        let db = MemoryBackend::new().with_table("t", &["id"]);
        let err = db.exec_sql("CREATE TABLE t (id int)").await.unwrap_err();
        assert_eq!(err.code(), Some("42P07"));
        assert!(db.exec_sql("CREATE TABLE IF NOT EXISTS t (id int)").await.is_ok());
    }

    #[tokio::test]
    async fn alter_add_column() {
        let db = MemoryBackend::new().with_table("lats_sales", &["id"]);
        db.exec_sql("ALTER TABLE lats_sales ADD COLUMN IF NOT EXISTS tax numeric(12,2) DEFAULT 0")
            .await
            .unwrap();
        assert!(db.select("lats_sales", "id,tax", 1).await.is_ok());
        let err = db
            .exec_sql("ALTER TABLE missing ADD COLUMN x int")
            .await
            .unwrap_err();
        assert!(err.is_missing_object());
    }

    #[tokio::test]
    async fn missing_table_select_is_pgrst205() {
        let db = MemoryBackend::new();
        let err = db.select("public.nope", "*", 1).await.unwrap_err();
        assert_eq!(err.code(), Some("PGRST205"));
        assert!(err.is_missing_object());
    }

    #[tokio::test]
    async fn unknown_keyword_is_syntax_error() {
        let db = MemoryBackend::new();
        let err = db.exec_sql("SELEC 1").await.unwrap_err();
        assert_eq!(err.code(), Some("42601"));
        assert_eq!(db.executed(), vec!["SELEC 1".to_string()]);
    }

    #[tokio::test]
    async fn injected_failure() {
        let db = MemoryBackend::new().fail_on(
            "payments",
            BackendError::api(403, Some("42501"), "permission denied"),
        );
        let err = db.exec_sql("DROP TABLE IF EXISTS payments").await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn create_function_registers_name() {
        let db = MemoryBackend::new();
        db.exec_sql(
            "CREATE OR REPLACE FUNCTION update_brands_updated_at() RETURNS trigger \
             AS $$ BEGIN RETURN NEW; END; $$ LANGUAGE plpgsql",
        )
        .await
        .unwrap();
        let state = db.lock();
        assert!(check_function_probe(&state, "WHERE proname = 'update_brands_updated_at'").is_ok());
        let err = check_function_probe(&state, "WHERE proname = 'other'").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.code(), Some("42883"));
    }
}
