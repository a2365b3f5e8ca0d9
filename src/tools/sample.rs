//! Table sampling tool.
//!
//! Implements `get_table_sample`: a bounded `SELECT *` over one table that
//! goes through the same guard and orchestrator as free-form queries.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseType, MAX_SAMPLE_LIMIT, TableSampleInput};
use crate::tools::format;
use crate::tools::query::QueryOrchestrator;
use std::sync::Arc;
use tracing::info;

/// Check the requested sample size.
pub fn validate_limit(limit: i64) -> DbResult<()> {
    if limit < 1 {
        return Err(DbError::invalid_input("Error: limit must be at least 1"));
    }
    if limit > MAX_SAMPLE_LIMIT {
        return Err(DbError::invalid_input(format!(
            "Error: limit cannot exceed {}",
            MAX_SAMPLE_LIMIT
        )));
    }
    Ok(())
}

/// Quote a plain or dot-qualified table name for the given dialect.
pub fn quote_table_name(table_name: &str, db_type: DatabaseType) -> DbResult<String> {
    let name = table_name.trim();
    let invalid = || DbError::invalid_input(format!("Error: invalid table name '{}'", table_name));

    if name.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = name.split('.').collect();
    if parts
        .iter()
        .any(|part| part.is_empty() || part.chars().any(char::is_control))
    {
        return Err(invalid());
    }

    Ok(parts
        .iter()
        .map(|part| db_type.quote_identifier(part))
        .collect::<Vec<_>>()
        .join("."))
}

/// Build the sampling statement.
pub fn sample_sql(table_name: &str, limit: i64, db_type: DatabaseType) -> DbResult<String> {
    validate_limit(limit)?;
    let table = quote_table_name(table_name, db_type)?;
    Ok(format!("SELECT * FROM {} LIMIT {}", table, limit))
}

/// Handler for the `get_table_sample` tool.
pub struct SampleToolHandler {
    connection_manager: Arc<ConnectionManager>,
    orchestrator: QueryOrchestrator,
}

impl SampleToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>, orchestrator: QueryOrchestrator) -> Self {
        Self {
            connection_manager,
            orchestrator,
        }
    }

    /// Return up to `limit` rows of a table as rendered text.
    pub async fn get_table_sample(&self, input: TableSampleInput) -> DbResult<String> {
        let sql = sample_sql(
            &input.table_name,
            input.limit,
            self.connection_manager.db_type(),
        )?;

        let mut session = self.connection_manager.read_session().await?;
        let outcome = self.orchestrator.execute(&mut session, &sql).await?;

        info!(
            table = %input.table_name,
            row_count = outcome.row_count(),
            "Table sampled"
        );

        let mut text = format::render(&outcome.rows);
        if let Some(note) = outcome.note {
            text.push_str("\n\n");
            text.push_str(&note);
        }
        Ok(text)
    }
}
