//! Result rendering for MCP tools.
//!
//! Rows are turned into text the assistant can show as-is:
//! - no rows: a fixed sentinel
//! - one row: `key: value` lines in column order
//! - two or more rows: a markdown table over the sorted union of columns

use crate::models::Row;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

pub const NO_RESULTS: &str = "No results found.";

/// Uniform text form of a value. Null renders as an empty string.
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

/// Make a value safe inside a markdown table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

/// Render rows as plain text or a markdown table.
pub fn render(rows: &[Row]) -> String {
    match rows {
        [] => NO_RESULTS.to_string(),
        [row] => format_as_lines(row),
        _ => format_as_markdown(rows),
    }
}

fn format_as_lines(row: &Row) -> String {
    row.iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_as_markdown(rows: &[Row]) -> String {
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(table_line(columns.iter().map(|c| c.to_string())));
    lines.push(table_line(columns.iter().map(|_| "---".to_string())));

    for row in rows {
        lines.push(table_line(columns.iter().map(|col| {
            row.get(*col)
                .map(|v| escape_cell(&format_value(v)))
                .unwrap_or_default()
        })));
    }

    lines.join("\n")
}

fn table_line(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}
