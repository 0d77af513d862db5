//! Post-migration verification probes.
//!
//! A probe issues one cheap read against the backend and classifies the
//! answer. It never fails: anything it cannot decide is reported as
//! [`ProbeStatus::Inconclusive`](lats_core::ProbeStatus::Inconclusive).

use lats_core::ident::QualifiedName;
use lats_core::{CoreError, ProbeReport, ProbeTarget};
use lats_supabase::{BackendError, SqlBackend};

/// Probe one target.
pub async fn probe<B: SqlBackend>(backend: &B, target: &ProbeTarget) -> ProbeReport {
    if let Err(e) = target.validate() {
        tracing::warn!(%target, error = %e, "probe target rejected");
        return ProbeReport::inconclusive(target.clone(), e.to_string());
    }

    let outcome = match target {
        ProbeTarget::Table { name } => backend.select(name, "*", 1).await.map(|rows| rows.len()),
        ProbeTarget::Columns { table, columns } => backend
            .select(table, &columns.join(","), 1)
            .await
            .map(|rows| rows.len()),
        ProbeTarget::Function { name } => match function_probe_sql(name) {
            Ok(sql) => backend.exec_sql(&sql).await.map(|()| 0),
            Err(e) => return ProbeReport::inconclusive(target.clone(), e.to_string()),
        },
    };

    let report = classify(backend, target, outcome);
    tracing::debug!(%target, status = %report.status, "probe finished");
    report
}

/// Probe every target in order.
pub async fn probe_all<B: SqlBackend>(backend: &B, targets: &[ProbeTarget]) -> Vec<ProbeReport> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        reports.push(probe(backend, target).await);
    }
    reports
}

fn classify<B: SqlBackend>(
    backend: &B,
    target: &ProbeTarget,
    outcome: Result<usize, BackendError>,
) -> ProbeReport {
    match outcome {
        Ok(rows) => ProbeReport::present(target.clone(), rows),
        // Function probes go through the SQL procedure, so its absence says
        // nothing about the function being probed.
        Err(e)
            if matches!(target, ProbeTarget::Function { .. })
                && e.is_missing_rpc(backend.exec_function()) =>
        {
            tracing::warn!(%target, error = %e, "probe inconclusive");
            ProbeReport::inconclusive(target.clone(), e.summary())
        }
        Err(e) if e.is_missing_object() => ProbeReport::missing(target.clone(), e.summary()),
        Err(e) => {
            tracing::warn!(%target, error = %e, "probe inconclusive");
            ProbeReport::inconclusive(target.clone(), e.summary())
        }
    }
}

/// A read-only `DO` block that raises `undefined_function` (42883) unless a
/// function called `name` exists in its schema (default `public`).
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] if `name` is not a plain or
/// schema-qualified identifier.
pub fn function_probe_sql(name: &str) -> Result<String, CoreError> {
    let name = QualifiedName::parse(name)?;
    let schema = name.schema_or("public");
    let function = &name.name;
    Ok(format!(
        "DO $probe$ BEGIN IF NOT EXISTS (SELECT 1 FROM pg_catalog.pg_proc p \
         JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace \
         WHERE p.proname = '{function}' AND n.nspname = '{schema}') THEN \
         RAISE EXCEPTION 'function {schema}.{function} does not exist' USING ERRCODE = '42883'; \
         END IF; END $probe$"
    ))
}
