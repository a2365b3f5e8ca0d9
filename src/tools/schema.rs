//! Schema introspection tool.
//!
//! Implements `get_schema`.

use crate::db::ConnectionManager;
use crate::db::schema::SchemaInspector;
use crate::error::DbResult;
use crate::models::DatabaseSchema;
use std::sync::Arc;
use tracing::info;

/// Handler for schema introspection.
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl SchemaToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Describe every table: columns, primary keys, foreign keys and indexes.
    pub async fn get_schema(&self) -> DbResult<DatabaseSchema> {
        let pool = self.connection_manager.pool().await?;
        let schema = SchemaInspector::database_schema(pool).await?;

        info!(
            db_type = %pool.db_type(),
            table_count = schema.tables.len(),
            "Schema inspected"
        );

        Ok(schema)
    }
}
