//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP - the default and recommended mode.
//! With the `http` feature a small health listener runs next to it.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult, config::StdioConfig};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    config: StdioConfig,
}

impl StdioTransport {
    /// Create a new STDIO transport with the given config.
    pub fn new(config: StdioConfig) -> Self {
        Self { config }
    }

    /// Run the STDIO transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        #[cfg(feature = "http")]
        let health = match self.config.health_port {
            Some(port) => {
                let addr = format!("{}:{}", self.config.health_host, port);
                Some(super::http::spawn_health_listener(&addr, server.clone()).await?)
            }
            None => None,
        };

        let status = server.clone();
        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;
        status.mark_ready();
        info!("Ready - communicating via stdin/stdout");

        service
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        #[cfg(feature = "http")]
        if let Some(handle) = health {
            handle.abort();
        }

        info!("STDIO transport finished");
        Ok(())
    }
}
