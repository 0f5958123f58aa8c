//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. Only the tools capability is served.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` method (core logic against a [`BackendApi`])
//! - `http_handler()` method (called via ToolRegistry for HTTP transport)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use super::backend::{BackendApi, HttpBackend};
use super::config::Config;
use crate::domains::tools::build_tool_router;

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

const INSTRUCTIONS: &str = "Whistle lets people find and offer services nearby. \
Sign in with sign_in (phone, country code, name, location), then verify_otp with the SMS code and the returned user_id to obtain an access token. \
Pass that access_token to the whistle and user tools. Use search to find providers around a latitude/longitude.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. Every tool
/// route shares the same backend client.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Backend REST API client shared by all tools.
    backend: Arc<dyn BackendApi>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,

    /// Set once a transport is accepting requests. Shared by clones.
    ready: Arc<AtomicBool>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Builds the production HTTP backend client from `config.backend`.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        if config.backend.base_url.trim().is_empty() {
            return Err(crate::core::Error::config("MCP_API_BASE_URL is empty"));
        }
        let backend = HttpBackend::new(&config.backend)?;
        info!(base_url = %config.backend.base_url, "Backend client ready");
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a server on top of an existing backend client.
    pub fn with_backend(config: Config, backend: Arc<dyn BackendApi>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(backend.clone()),
            config: Arc::new(config),
            backend,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the server as ready to take tool calls.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        info!("MCP server marked as ready");
    }

    /// Whether a transport has started serving.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                let mut tool = serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                });
                if let Some(output_schema) = t.output_schema {
                    tool["outputSchema"] = serde_json::json!(output_schema);
                }
                tool
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    ///
    /// This method uses the ToolRegistry to dispatch to the appropriate
    /// tool handler. Each tool's http_handler is defined in its own file
    /// under `domains/tools/definitions/`.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.backend.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;
    use serde_json::json;

    fn test_server(body: serde_json::Value) -> McpServer {
        McpServer::with_backend(Config::default(), Arc::new(StubBackend::ok(body)))
    }

    #[test]
    fn test_new_builds_http_backend() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.name(), "whistle-mcp-server");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        let mut config = Config::default();
        config.backend.base_url = String::new();
        assert!(matches!(McpServer::new(config), Err(crate::core::Error::Config(_))));
    }

    #[test]
    fn test_ready_flag_is_shared_by_clones() {
        let server = test_server(json!({}));
        let clone_view = server.clone();
        assert!(!clone_view.is_ready());

        server.mark_ready();
        assert!(clone_view.is_ready());
    }

    #[test]
    fn test_list_tools() {
        let server = test_server(json!({}));
        let tools = server.list_tools();
        assert_eq!(tools.len(), 12);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));

        let search = tools.iter().find(|t| t["name"] == "search").unwrap();
        assert!(search["outputSchema"].is_object());
    }

    #[test]
    fn test_server_info() {
        let info = test_server(json!({})).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert_eq!(info.server_info.name, "whistle-mcp-server");
        assert!(info.instructions.unwrap().contains("verify_otp"));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_call_tool_uses_backend() {
        let server = test_server(json!({"message": "OTP sent"}));
        let result = server
            .call_tool("resend_otp", json!({"user_id": "687e1690"}))
            .await
            .unwrap();
        assert_eq!(result["structuredContent"]["message"], "OTP sent");
    }
}
