//! Query execution.
//!
//! [`QueryOrchestrator`] runs one statement end to end: guard, read-only
//! hint, collect, truncate. [`QueryToolHandler`] wraps it for the
//! `execute_query` MCP tool.

use crate::db::{ConnectionManager, SqlRunner};
use crate::error::{DbError, DbResult};
use crate::models::{ExecuteQueryInput, ExecuteQueryOutput, QueryOutcome};
use crate::tools::{format, guard};
use std::sync::Arc;
use tracing::{debug, info};

/// Hint returned with every `execute_query` result.
pub const PRESENTATION_HINT: &str = "Present these results to the user as a markdown table. \
     Use the `formatted` field as-is when it already contains a table, and mention the note \
     when the result was truncated.";

/// Runs guarded read-only statements against an [`SqlRunner`].
#[derive(Debug, Clone, Copy)]
pub struct QueryOrchestrator {
    max_rows: usize,
}

impl QueryOrchestrator {
    /// `max_rows` is clamped to at least one row.
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows: max_rows.max(1),
        }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Execute a single read-only statement.
    ///
    /// A guard rejection is returned as [`DbError::Validation`] before the
    /// runner is touched. Any runner failure becomes [`DbError::Execution`].
    pub async fn execute<R: SqlRunner>(&self, runner: &mut R, sql: &str) -> DbResult<QueryOutcome> {
        guard::classify(sql).into_result()?;
        let sql = guard::strip_trailing_semicolon(sql);

        if let Err(e) = runner.request_read_only().await {
            debug!(error = %e, "Read-only mode not applied");
        }

        let rows = runner
            .fetch_rows(sql)
            .await
            .map_err(|e| DbError::execution(e.to_string()))?;

        let fetched = rows.len();
        let outcome = QueryOutcome::truncated(rows, self.max_rows);
        if outcome.is_truncated() {
            debug!(fetched, max_rows = self.max_rows, "Result truncated");
        }
        Ok(outcome)
    }
}

/// Handler for the `execute_query` tool.
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
    orchestrator: QueryOrchestrator,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>, orchestrator: QueryOrchestrator) -> Self {
        Self {
            connection_manager,
            orchestrator,
        }
    }

    /// Run a statement and package rows with their rendered form.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ExecuteQueryOutput> {
        // Reject before acquiring a connection.
        guard::classify(&input.sql).into_result()?;

        let mut session = self.connection_manager.read_session().await?;
        let outcome = self.orchestrator.execute(&mut session, &input.sql).await?;

        info!(
            row_count = outcome.row_count(),
            truncated = outcome.is_truncated(),
            "Query executed"
        );

        Ok(ExecuteQueryOutput {
            formatted: format::render(&outcome.rows),
            row_count: outcome.row_count(),
            rows: outcome.rows,
            note: outcome.note,
            presentation: PRESENTATION_HINT.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use serde_json::json;

    #[derive(Default)]
    struct FakeRunner {
        rows: Vec<Row>,
        fail_read_only: bool,
        fail_fetch: Option<String>,
        executed: Vec<String>,
        read_only_requests: usize,
    }

    impl SqlRunner for FakeRunner {
        async fn request_read_only(&mut self) -> DbResult<()> {
            self.read_only_requests += 1;
            if self.fail_read_only {
                Err(DbError::execution("read-only not supported"))
            } else {
                Ok(())
            }
        }

        async fn fetch_rows(&mut self, sql: &str) -> DbResult<Vec<Row>> {
            self.executed.push(sql.to_string());
            match &self.fail_fetch {
                Some(msg) => Err(DbError::execution(msg.clone())),
                None => Ok(self.rows.clone()),
            }
        }
    }

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .map(|i| {
                let mut r = Row::new();
                r.insert("id".to_string(), json!(i));
                r
            })
            .collect()
    }

    #[tokio::test]
    async fn test_rejected_query_never_reaches_runner() {
        let mut runner = FakeRunner::default();
        let err = QueryOrchestrator::new(10)
            .execute(&mut runner, "DROP TABLE users")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation { .. }));
        assert_eq!(err.to_string(), "Forbidden keyword detected: drop");
        assert!(runner.executed.is_empty());
        assert_eq!(runner.read_only_requests, 0);
    }

    #[tokio::test]
    async fn test_trailing_semicolon_stripped_before_execution() {
        let mut runner = FakeRunner::default();
        QueryOrchestrator::new(10)
            .execute(&mut runner, "  SELECT 1 ;  ")
            .await
            .unwrap();
        assert_eq!(runner.executed, vec!["SELECT 1".to_string()]);
    }

    #[tokio::test]
    async fn test_truncates_to_max_rows_with_note() {
        let mut runner = FakeRunner {
            rows: rows(5),
            ..Default::default()
        };
        let outcome = QueryOrchestrator::new(3)
            .execute(&mut runner, "SELECT id FROM t")
            .await
            .unwrap();
        assert_eq!(outcome.row_count(), 3);
        assert_eq!(outcome.rows[2]["id"], json!(3));
        assert_eq!(outcome.note.as_deref(), Some("Result truncated to 3 rows."));
    }

    #[tokio::test]
    async fn test_at_limit_has_no_note() {
        let mut runner = FakeRunner {
            rows: rows(3),
            ..Default::default()
        };
        let outcome = QueryOrchestrator::new(3)
            .execute(&mut runner, "SELECT id FROM t")
            .await
            .unwrap();
        assert_eq!(outcome.row_count(), 3);
        assert!(outcome.note.is_none());
    }

    #[tokio::test]
    async fn test_read_only_failure_is_ignored() {
        let mut runner = FakeRunner {
            rows: rows(1),
            fail_read_only: true,
            ..Default::default()
        };
        let outcome = QueryOrchestrator::new(10)
            .execute(&mut runner, "SELECT id FROM t")
            .await
            .unwrap();
        assert_eq!(outcome.row_count(), 1);
        assert_eq!(runner.read_only_requests, 1);
    }

    #[tokio::test]
    async fn test_runner_failure_becomes_execution_error() {
        let mut runner = FakeRunner {
            fail_fetch: Some("no such table: missing".to_string()),
            ..Default::default()
        };
        let err = QueryOrchestrator::new(10)
            .execute(&mut runner, "SELECT * FROM missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
        assert!(err.to_string().contains("no such table: missing"));
    }

    #[test]
    fn test_zero_max_rows_clamped() {
        assert_eq!(QueryOrchestrator::new(0).max_rows(), 1);
    }
}
