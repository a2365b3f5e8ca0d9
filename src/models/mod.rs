//! Data models for the EchoDB MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, ConnectionInfo, DatabaseType};
pub use query::{
    DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_ROW_LIMIT, DEFAULT_SAMPLE_LIMIT, ExecuteQueryInput,
    ExecuteQueryOutput, MAX_SAMPLE_LIMIT, QueryOutcome, Row, TableSampleInput, truncation_note,
};
pub use schema::{ColumnDefinition, DatabaseSchema, ForeignKey, IndexInfo, TableSchema};
