pub mod bootstrap_sql;
pub mod config;
pub mod probe;
pub mod run;
pub mod schema;
pub mod split;

use lats_core::ProbeTarget;

/// Parse `--verify` / `probe` arguments, failing on the first invalid one.
pub fn parse_targets(values: &[String]) -> anyhow::Result<Vec<ProbeTarget>> {
    values
        .iter()
        .map(|value| {
            value
                .parse::<ProbeTarget>()
                .map_err(|error| anyhow::anyhow!("invalid probe target '{value}': {error}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_targets;
    use lats_core::ProbeTarget;

    #[test]
    fn parses_all_target_kinds() {
        let targets = parse_targets(&[
            "lats_brands".to_string(),
            "lats_sales:tax,discount".to_string(),
            "fn:update_brands_updated_at".to_string(),
        ])
        .expect("targets should parse");
        assert!(matches!(targets[0], ProbeTarget::Table { .. }));
        assert!(
            matches!(targets[1], ProbeTarget::Columns { ref columns, .. } if columns.len() == 2)
        );
        assert!(matches!(targets[2], ProbeTarget::Function { .. }));
    }

    #[test]
    fn rejects_invalid_target_with_its_text() {
        let error = parse_targets(&["ok".to_string(), "bad name".to_string()]).unwrap_err();
        assert!(error.to_string().contains("'bad name'"));
    }
}
