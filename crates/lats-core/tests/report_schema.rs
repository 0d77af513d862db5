//! JSON Schema generation for the report types printed by `latsdb schema`.

use lats_core::{ProbeReport, RunReport, SplitFile, SplitMode, SplitOutput, Statement};
use pretty_assertions::assert_eq;

fn properties(schema: &serde_json::Value) -> Vec<String> {
    let mut keys: Vec<String> = schema["properties"]
        .as_object()
        .expect("schema should have properties")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

#[test]
fn run_report_schema_lists_top_level_fields() {
    let schema = serde_json::to_value(schemars::schema_for!(RunReport)).unwrap();
    assert_eq!(
        properties(&schema),
        vec![
            "dry_run",
            "files",
            "finished_at",
            "outcome",
            "probes",
            "started_at",
            "totals",
        ]
    );
}

#[test]
fn probe_report_schema_requires_status() {
    let schema = serde_json::to_value(schemars::schema_for!(ProbeReport)).unwrap();
    let required = schema["required"].as_array().expect("required list");
    assert!(required.iter().any(|v| v == "status"));
    assert!(required.iter().any(|v| v == "target"));
}

#[test]
fn split_file_schema_matches_serialized_keys() {
    let schema = serde_json::to_value(schemars::schema_for!(SplitFile)).unwrap();
    assert_eq!(properties(&schema), vec!["mode", "path", "skipped", "statements"]);

    let file = SplitFile {
        path: "supabase/migrations/001_brands.sql".into(),
        mode: SplitMode::Naive,
        output: SplitOutput {
            statements: vec![Statement {
                ordinal: 1,
                line: 1,
                sql: "SELECT 1".into(),
            }],
            skipped: Vec::new(),
        },
    };
    let value = serde_json::to_value(&file).unwrap();
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, properties(&schema));
}
