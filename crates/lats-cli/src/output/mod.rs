use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod console;
pub mod table;

/// Render a serializable response to a string in the requested format.
///
/// Commands with a dedicated console layout print that for `text` and only
/// fall back here for the structured formats.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Table => render_key_value_table(value),
        OutputFormat::Text => {
            let mut lines = Vec::new();
            flatten("", &serde_json::to_value(value)?, &mut lines);
            Ok(lines.join("\n"))
        }
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

pub fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_key_value_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut lines = Vec::new();
    flatten("", &serde_json::to_value(value)?, &mut lines);
    let rows = lines
        .iter()
        .map(|line| {
            let (key, value) = line.split_once(" = ").unwrap_or((line.as_str(), ""));
            vec![key.to_string(), value.to_string()]
        })
        .collect::<Vec<_>>();
    Ok(table::render_table(&["key", "value"], &rows, table_options()))
}

/// Flatten nested objects into `a.b = value` lines, in key order.
fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, child) in entries {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, lines);
            }
        }
        other => lines.push(format!("{prefix} = {}", value_to_cell(other))),
    }
}

pub fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
