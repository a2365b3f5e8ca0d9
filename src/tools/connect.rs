//! Connectivity check tool.

use crate::db::ConnectionManager;
use crate::error::DbResult;
use crate::models::ConnectionInfo;
use std::sync::Arc;
use tracing::info;

/// Handler for `connect_database`.
pub struct ConnectToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl ConnectToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Open the pool if needed and run `SELECT 1`.
    pub async fn connect_database(&self) -> DbResult<ConnectionInfo> {
        let info = self.connection_manager.connect().await?;
        info!(
            db_type = %info.database_type,
            server_version = info.server_version.as_deref().unwrap_or("unknown"),
            "Database connection verified"
        );
        Ok(info)
    }
}
