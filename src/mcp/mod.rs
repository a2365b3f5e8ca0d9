//! MCP server integration module.
//!
//! Binds the database tools and prompt templates to the MCP protocol
//! using the rmcp framework.

pub mod service;

pub use service::EchoDbService;
