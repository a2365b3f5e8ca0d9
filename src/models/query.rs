//! Query-related data models.
//!
//! This module defines types for SQL query requests and results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default maximum number of rows returned by a single query.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default row count for table samples.
pub const DEFAULT_SAMPLE_LIMIT: i64 = 5;

/// Upper bound for table samples.
pub const MAX_SAMPLE_LIMIT: i64 = 100;

/// One result row: column name to value, in result-metadata order.
pub type Row = serde_json::Map<String, JsonValue>;

/// Rows collected by the orchestrator plus an optional truncation advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub rows: Vec<Row>,
    pub note: Option<String>,
}

impl QueryOutcome {
    /// Keep at most `limit` rows, attaching the truncation note when rows were dropped.
    pub fn truncated(mut rows: Vec<Row>, limit: usize) -> Self {
        if rows.len() > limit {
            rows.truncate(limit);
            Self {
                rows,
                note: Some(truncation_note(limit)),
            }
        } else {
            Self { rows, note: None }
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_truncated(&self) -> bool {
        self.note.is_some()
    }
}

/// Advisory attached when a result was cut to the row limit.
pub fn truncation_note(limit: usize) -> String {
    format!("Result truncated to {} rows.", limit)
}

/// Input for `execute_query`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// A single SELECT (or WITH ... SELECT) statement
    pub sql: String,
}

/// Output of `execute_query`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExecuteQueryOutput {
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    /// Rows rendered as plain text or a markdown table
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// How the assistant should present the result
    pub presentation: String,
}

/// Input for `get_table_sample`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableSampleInput {
    /// Table name, optionally schema-qualified (`schema.table`)
    pub table_name: String,
    /// Number of rows to return (1-100, default 5)
    #[serde(default = "default_sample_limit")]
    pub limit: i64,
}

fn default_sample_limit() -> i64 {
    DEFAULT_SAMPLE_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(n: i64) -> Row {
        let mut r = Row::new();
        r.insert("n".to_string(), json!(n));
        r
    }

    #[test]
    fn test_truncated_over_limit() {
        let outcome = QueryOutcome::truncated((0..5).map(row).collect(), 3);
        assert_eq!(outcome.row_count(), 3);
        assert_eq!(outcome.note.as_deref(), Some("Result truncated to 3 rows."));
        assert_eq!(outcome.rows[2]["n"], json!(2));
    }

    #[test]
    fn test_truncated_exactly_at_limit() {
        let outcome = QueryOutcome::truncated((0..3).map(row).collect(), 3);
        assert_eq!(outcome.row_count(), 3);
        assert!(!outcome.is_truncated());
    }

    #[test]
    fn test_sample_input_default_limit() {
        let input: TableSampleInput = serde_json::from_value(json!({"table_name": "users"})).unwrap();
        assert_eq!(input.limit, 5);
    }
}
