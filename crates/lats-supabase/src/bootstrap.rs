//! DDL for the SQL-execution procedure the runner depends on.
//!
//! PostgREST exposes no endpoint that runs arbitrary SQL. Projects install a
//! `SECURITY DEFINER` procedure that `EXECUTE`s its argument and expose it
//! only to the service role.

use lats_core::CoreError;
use lats_core::ident::{QualifiedName, validate_identifier};

/// DDL installing `function(param text)`, e.g. `public.exec_sql(sql text)`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] if either name is not a plain identifier.
pub fn exec_sql_function_ddl(function: &str, param: &str) -> Result<String, CoreError> {
    let function = QualifiedName::parse(function)?;
    validate_identifier(param)?;
    let schema = function.schema_or("public");
    let name = &function.name;

    Ok(format!(
        "CREATE OR REPLACE FUNCTION {schema}.{name}({param} text)
RETURNS void
LANGUAGE plpgsql
SECURITY DEFINER
SET search_path = {schema}
AS $$
BEGIN
  EXECUTE {param};
END;
$$;

REVOKE ALL ON FUNCTION {schema}.{name}(text) FROM PUBLIC;
REVOKE ALL ON FUNCTION {schema}.{name}(text) FROM anon, authenticated;
GRANT EXECUTE ON FUNCTION {schema}.{name}(text) TO service_role;

NOTIFY pgrst, 'reload schema';
"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names() {
        let ddl = exec_sql_function_ddl("exec_sql", "sql").unwrap();
        assert!(ddl.starts_with("CREATE OR REPLACE FUNCTION public.exec_sql(sql text)"));
        assert!(ddl.contains("EXECUTE sql;"));
        assert!(ddl.contains("TO service_role"));
    }

    #[test]
    fn schema_qualified_function() {
        let ddl = exec_sql_function_ddl("admin.run_sql", "query").unwrap();
        assert!(ddl.contains("FUNCTION admin.run_sql(query text)"));
        assert!(ddl.contains("SET search_path = admin"));
    }

    #[test]
    fn rejects_injection_in_names() {
        assert!(exec_sql_function_ddl("exec_sql(); DROP", "sql").is_err());
        assert!(exec_sql_function_ddl("exec_sql", "sql text, x").is_err());
    }
}
