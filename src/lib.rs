//! EchoDB MCP Server Library
//!
//! Read-only MCP (Model Context Protocol) tools and prompt templates that let
//! AI assistants inspect and query SQL databases (SQLite, PostgreSQL, MySQL).

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod prompts;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::EchoDbService;
