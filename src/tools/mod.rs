//! MCP tool implementations.
//!
//! - `guard`: lexical read-only gate
//! - `format`: row rendering
//! - `query`: execution orchestrator and `execute_query`
//! - `sample`: `get_table_sample`
//! - `schema`: `get_schema`
//! - `connect`: `connect_database`

pub mod connect;
pub mod format;
pub mod guard;
pub mod query;
pub mod sample;
pub mod schema;

pub use connect::ConnectToolHandler;
pub use guard::{Classification, classify};
pub use query::{QueryOrchestrator, QueryToolHandler};
pub use sample::SampleToolHandler;
pub use schema::SchemaToolHandler;
