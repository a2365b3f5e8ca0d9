//! Database abstraction layer.
//!
//! - Lazy connection pool management
//! - Scoped read sessions
//! - Schema introspection
//! - Type mappings from driver rows to JSON

pub mod pool;
pub mod schema;
pub mod session;
pub mod types;

pub use pool::{ConnectionManager, DbPool};
pub use schema::SchemaInspector;
pub use session::{ReadSession, SqlRunner};
