//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout, the
//! standard mode for CLI-launched MCP servers.

use crate::error::{DbError, DbResult};
use crate::mcp::EchoDbService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};

/// Stdio transport implementation.
pub struct StdioTransport {
    service: EchoDbService,
}

impl StdioTransport {
    pub fn new(service: EchoDbService) -> Self {
        Self { service }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let running_service = self
            .service
            .clone()
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => info!("Stdio transport completed normally"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing database connection");
        self.service.connection_manager().close().await;

        if shutdown_requested {
            // A pending stdin read cannot be cancelled from select!.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolOptions;
    use crate::db::ConnectionManager;
    use crate::models::ConnectionConfig;
    use std::sync::Arc;

    #[test]
    fn test_stdio_transport_creation() {
        let config = ConnectionConfig::new("sqlite::memory:", PoolOptions::default()).unwrap();
        let service = EchoDbService::new(Arc::new(ConnectionManager::new(config)), 100);
        let transport = StdioTransport::new(service);
        assert_eq!(transport.name(), "stdio");
    }
}
