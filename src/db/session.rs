//! Scoped read sessions.
//!
//! A [`ReadSession`] owns one pooled connection for the duration of a single
//! request. The connection goes back to the pool when the session is dropped,
//! on success and failure alike.

use crate::db::pool::DbPool;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseType, Row};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql, Postgres, Sqlite};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Capability to run one read-only statement and collect its rows.
///
/// The orchestrator only talks to this trait, so tests can substitute a
/// double for a real database.
pub trait SqlRunner: Send {
    /// Ask the engine to treat the session as read-only. Best effort: an error
    /// here does not stop the query.
    fn request_read_only(&mut self) -> impl Future<Output = DbResult<()>> + Send;

    /// Run `sql` and collect every row in engine order.
    fn fetch_rows(&mut self, sql: &str) -> impl Future<Output = DbResult<Vec<Row>>> + Send;
}

/// Whole seconds of `duration`, saturating at `u32::MAX`.
fn timeout_secs(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs()).unwrap_or(u32::MAX)
}

enum SessionConnection {
    MySql(PoolConnection<MySql>),
    Postgres(PoolConnection<Postgres>),
    SQLite(PoolConnection<Sqlite>),
}

/// One pooled connection scoped to a single tool call.
pub struct ReadSession {
    conn: SessionConnection,
    query_timeout: Duration,
}

impl std::fmt::Debug for ReadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSession")
            .field("db_type", &self.db_type())
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

impl ReadSession {
    /// Acquire a connection from the pool.
    pub async fn acquire(pool: &DbPool, query_timeout: Duration) -> DbResult<Self> {
        let conn = match pool {
            DbPool::MySql(p) => SessionConnection::MySql(p.acquire().await?),
            DbPool::Postgres(p) => SessionConnection::Postgres(p.acquire().await?),
            DbPool::SQLite(p) => SessionConnection::SQLite(p.acquire().await?),
        };
        Ok(Self {
            conn,
            query_timeout,
        })
    }

    pub fn db_type(&self) -> DatabaseType {
        match self.conn {
            SessionConnection::MySql(_) => DatabaseType::MySQL,
            SessionConnection::Postgres(_) => DatabaseType::PostgreSQL,
            SessionConnection::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

impl SqlRunner for ReadSession {
    async fn request_read_only(&mut self) -> DbResult<()> {
        // Session-level settings persist on the pooled connection, which only
        // ever serves this read-only server.
        let result = match &mut self.conn {
            SessionConnection::Postgres(conn) => (&mut **conn)
                .execute("SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY")
                .await
                .map(|_| ()),
            SessionConnection::MySql(conn) => (&mut **conn)
                .execute("SET SESSION TRANSACTION READ ONLY")
                .await
                .map(|_| ()),
            SessionConnection::SQLite(conn) => (&mut **conn)
                .execute("PRAGMA query_only = ON")
                .await
                .map(|_| ()),
        };
        result.map_err(DbError::from)
    }

    async fn fetch_rows(&mut self, sql: &str) -> DbResult<Vec<Row>> {
        let query_timeout = self.query_timeout;
        let timed_out = || DbError::timeout("query execution", timeout_secs(query_timeout));
        debug!(sql = %sql, timeout_secs = query_timeout.as_secs(), "Executing query");

        // Raw SQL without parameters skips prepared statements.
        let rows: Vec<Row> = match &mut self.conn {
            SessionConnection::MySql(conn) => {
                match timeout(query_timeout, (&mut **conn).fetch_all(sql)).await {
                    Ok(rows) => rows?.iter().map(RowToJson::to_row).collect(),
                    Err(_) => return Err(timed_out()),
                }
            }
            SessionConnection::Postgres(conn) => {
                match timeout(query_timeout, (&mut **conn).fetch_all(sql)).await {
                    Ok(rows) => rows?.iter().map(RowToJson::to_row).collect(),
                    Err(_) => return Err(timed_out()),
                }
            }
            SessionConnection::SQLite(conn) => {
                match timeout(query_timeout, (&mut **conn).fetch_all(sql)).await {
                    Ok(rows) => rows?.iter().map(RowToJson::to_row).collect(),
                    Err(_) => return Err(timed_out()),
                }
            }
        };
        Ok(rows)
    }
}
