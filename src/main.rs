//! MCP Server Entry Point
//!
//! This is the main entry point for the Whistle MCP server. It loads
//! configuration, initializes logging, and starts the server with the
//! configured transport.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use whistle_mcp_server::core::config::{LogFormat, LoggingConfig};
use whistle_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment (and .env)
    let config = Config::from_env();

    init_logging(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);
    tracing::debug!(backend = ?config.backend, "Loaded configuration");

    let server = McpServer::new(config.clone())?;

    info!("Server initialized");

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` directives are honored; the configured level is added as the
/// default directive. Output goes to stderr since stdout carries the STDIO
/// protocol.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
