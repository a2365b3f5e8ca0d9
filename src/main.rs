//! EchoDB MCP Server - Main entry point.
//!
//! Serves read-only database tools and prompt templates over MCP
//! for SQLite, PostgreSQL and MySQL.

use echodb_mcp::config::{Config, TransportMode};
use echodb_mcp::db::ConnectionManager;
use echodb_mcp::mcp::EchoDbService;
use echodb_mcp::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays
/// free for the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    if config.enable_logs {
        init_tracing(&config);
    }

    info!(
        transport = %config.transport,
        max_rows = config.max_rows,
        "Starting EchoDB MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_config = config.parse_database()?;
    db_config.pool_options.validate()?;
    let conn_config = db_config.into_connection_config()?;

    // The pool opens on first use; connect_database reports failures.
    let connection_manager = Arc::new(
        ConnectionManager::new(conn_config).with_query_timeout(config.query_timeout_duration()),
    );
    let service = EchoDbService::new(connection_manager, config.max_rows);

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(service).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                service,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
