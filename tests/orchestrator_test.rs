//! Execution orchestrator against an in-memory runner.

use echodb_mcp::db::SqlRunner;
use echodb_mcp::error::{DbError, DbResult};
use echodb_mcp::models::Row;
use echodb_mcp::tools::QueryOrchestrator;
use serde_json::json;

/// Returns a fixed number of rows and records what it was asked to run.
struct ScriptedRunner {
    row_count: usize,
    read_only_supported: bool,
    statements: Vec<String>,
}

impl ScriptedRunner {
    fn returning(row_count: usize) -> Self {
        Self {
            row_count,
            read_only_supported: true,
            statements: Vec::new(),
        }
    }
}

impl SqlRunner for ScriptedRunner {
    async fn request_read_only(&mut self) -> DbResult<()> {
        if self.read_only_supported {
            Ok(())
        } else {
            Err(DbError::execution("unsupported"))
        }
    }

    async fn fetch_rows(&mut self, sql: &str) -> DbResult<Vec<Row>> {
        self.statements.push(sql.to_string());
        Ok((0..self.row_count)
            .map(|i| {
                let mut row = Row::new();
                row.insert("n".to_string(), json!(i));
                row
            })
            .collect())
    }
}

#[tokio::test]
async fn test_five_rows_limit_three() {
    let mut runner = ScriptedRunner::returning(5);
    let outcome = QueryOrchestrator::new(3)
        .execute(&mut runner, "SELECT n FROM numbers")
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 3);
    assert_eq!(outcome.note.as_deref(), Some("Result truncated to 3 rows."));
}

#[tokio::test]
async fn test_two_rows_limit_three() {
    let mut runner = ScriptedRunner::returning(2);
    let outcome = QueryOrchestrator::new(3)
        .execute(&mut runner, "SELECT n FROM numbers")
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.note, None);
}

#[tokio::test]
async fn test_rows_keep_engine_order() {
    let mut runner = ScriptedRunner::returning(4);
    let outcome = QueryOrchestrator::new(10)
        .execute(&mut runner, "SELECT n FROM numbers")
        .await
        .unwrap();
    let values: Vec<_> = outcome.rows.iter().map(|r| r["n"].clone()).collect();
    assert_eq!(values, vec![json!(0), json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_semicolon_stripped() {
    let mut runner = ScriptedRunner::returning(1);
    QueryOrchestrator::new(10)
        .execute(&mut runner, "SELECT 1;")
        .await
        .unwrap();
    assert_eq!(runner.statements, vec!["SELECT 1"]);
}

#[tokio::test]
async fn test_stacked_statement_never_executes() {
    let mut runner = ScriptedRunner::returning(1);
    let err = QueryOrchestrator::new(10)
        .execute(&mut runner, "SELECT 1; DROP TABLE x;")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
    assert!(runner.statements.is_empty());
}

#[tokio::test]
async fn test_limit_varies_per_orchestrator() {
    for limit in [1, 2, 5, 10] {
        let mut runner = ScriptedRunner::returning(5);
        let outcome = QueryOrchestrator::new(limit)
            .execute(&mut runner, "SELECT n FROM numbers")
            .await
            .unwrap();
        assert_eq!(outcome.rows.len(), limit.min(5));
        assert_eq!(outcome.note.is_some(), limit < 5);
    }
}

#[tokio::test]
async fn test_missing_read_only_support_is_not_fatal() {
    let mut runner = ScriptedRunner {
        read_only_supported: false,
        ..ScriptedRunner::returning(2)
    };
    let outcome = QueryOrchestrator::new(10)
        .execute(&mut runner, "SELECT n FROM numbers")
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 2);
}
