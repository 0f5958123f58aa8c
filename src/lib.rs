//! Whistle MCP Server Library
//!
//! This crate exposes the Whistle backend (phone sign-in, proximity search,
//! whistle management and user settings) as Model Context Protocol tools.
//! Every tool validates its input, forwards one request to the backend REST
//! API and reshapes the response into a structured result envelope.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the backend REST client, the
//!   MCP server handler and the STDIO/HTTP transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: the 12 MCP tools grouped by backend area (auth, search,
//!     user, whistle)
//!
//! # Example
//!
//! ```rust,no_run
//! use whistle_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
