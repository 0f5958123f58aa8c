//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use std::time::Instant;

use rmcp::model::Tool;
#[cfg(feature = "http")]
use tracing::{info, warn};

use crate::core::backend::BackendApi;

use super::definitions::{
    CreateWhistleTool, DeleteWhistleTool, GetUserProfileTool, ListWhistlesTool, ResendOtpTool,
    SearchTool, SignInTool, ToggleSoundTool, ToggleTrackingTool, ToggleVisibilityTool,
    UpdateWhistleTool, VerifyOtpTool,
};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
///
/// This struct provides a central point for:
/// - Listing all available tools
/// - Dispatching HTTP tool calls (when http feature is enabled)
pub struct ToolRegistry {
    backend: Arc<dyn BackendApi>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            SignInTool::NAME,
            VerifyOtpTool::NAME,
            ResendOtpTool::NAME,
            SearchTool::NAME,
            CreateWhistleTool::NAME,
            UpdateWhistleTool::NAME,
            DeleteWhistleTool::NAME,
            ListWhistlesTool::NAME,
            ToggleVisibilityTool::NAME,
            ToggleTrackingTool::NAME,
            ToggleSoundTool::NAME,
            GetUserProfileTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            SignInTool::to_tool(),
            VerifyOtpTool::to_tool(),
            ResendOtpTool::to_tool(),
            SearchTool::to_tool(),
            CreateWhistleTool::to_tool(),
            UpdateWhistleTool::to_tool(),
            DeleteWhistleTool::to_tool(),
            ListWhistlesTool::to_tool(),
            ToggleVisibilityTool::to_tool(),
            ToggleTrackingTool::to_tool(),
            ToggleSoundTool::to_tool(),
            GetUserProfileTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// Tool failures, including arguments that do not decode, come back in
    /// the tool's own result shape inside `Ok`; `Err` is reserved for
    /// unknown tools.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        if let serde_json::Value::Object(args) = &arguments {
            super::redact::log_tool_call(name, args);
        }
        let started = Instant::now();
        let backend = self.backend.clone();

        let result = match name {
            SignInTool::NAME => SignInTool::http_handler(arguments, backend).await,
            VerifyOtpTool::NAME => VerifyOtpTool::http_handler(arguments, backend).await,
            ResendOtpTool::NAME => ResendOtpTool::http_handler(arguments, backend).await,
            SearchTool::NAME => SearchTool::http_handler(arguments, backend).await,
            CreateWhistleTool::NAME => CreateWhistleTool::http_handler(arguments, backend).await,
            UpdateWhistleTool::NAME => UpdateWhistleTool::http_handler(arguments, backend).await,
            DeleteWhistleTool::NAME => DeleteWhistleTool::http_handler(arguments, backend).await,
            ListWhistlesTool::NAME => ListWhistlesTool::http_handler(arguments, backend).await,
            ToggleVisibilityTool::NAME => {
                ToggleVisibilityTool::http_handler(arguments, backend).await
            }
            ToggleTrackingTool::NAME => ToggleTrackingTool::http_handler(arguments, backend).await,
            ToggleSoundTool::NAME => ToggleSoundTool::http_handler(arguments, backend).await,
            GetUserProfileTool::NAME => GetUserProfileTool::http_handler(arguments, backend).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(format!("Unknown tool: {}", name));
            }
        };

        info!(
            tool_name = name,
            execution_time_ms = started.elapsed().as_millis() as u64,
            "Tool call completed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;

    fn test_backend() -> Arc<dyn BackendApi> {
        Arc::new(StubBackend::ok(serde_json::json!({"providers": []})))
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new(test_backend());
        let names = registry.tool_names();
        assert_eq!(names.len(), 12);
        for name in [
            "sign_in",
            "verify_otp",
            "resend_otp",
            "search",
            "create_whistle",
            "update_whistle",
            "delete_whistle",
            "list_whistles",
            "toggle_visibility",
            "toggle_tracking",
            "toggle_sound",
            "get_user_profile",
        ] {
            assert!(names.contains(&name), "{name} missing");
        }
    }

    #[test]
    fn test_tool_metadata_matches_names() {
        let registry = ToolRegistry::new(test_backend());
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), registry.tool_names().len());
        for tool in &tools {
            assert!(registry.tool_names().contains(&tool.name.as_ref()));
            assert!(tool.description.is_some());
        }
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_search() {
        let registry = ToolRegistry::new(test_backend());
        let result = registry
            .call_tool("search", serde_json::json!({ "latitude": 1.0, "longitude": 2.0 }))
            .await
            .unwrap();
        assert_eq!(result["structuredContent"]["total_count"], 0);
        assert_eq!(result["isError"], false);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_search_missing_latitude_keeps_result_shape() {
        let registry = ToolRegistry::new(test_backend());
        let result = registry
            .call_tool("search", serde_json::json!({ "longitude": 2.0 }))
            .await
            .unwrap();

        assert_eq!(result["isError"], true);
        let structured = &result["structuredContent"];
        assert_eq!(structured["total_count"], 0);
        assert_eq!(structured["providers"], serde_json::json!([]));
        assert_eq!(structured["search_location"]["longitude"], 2.0);
        assert!(structured["error"].as_str().unwrap().contains("latitude"));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_whistle_missing_description_keeps_status_shape() {
        let backend = Arc::new(StubBackend::ok(serde_json::json!({})));
        let registry = ToolRegistry::new(backend.clone());
        let result = registry
            .call_tool("create_whistle", serde_json::json!({ "access_token": "tok" }))
            .await
            .unwrap();

        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["status"], "error");
        assert!(
            result["structuredContent"]["message"]
                .as_str()
                .unwrap()
                .contains("description")
        );
        assert!(backend.requests().is_empty());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_auth_missing_user_id_keeps_envelope_shape() {
        let backend = Arc::new(StubBackend::ok(serde_json::json!({})));
        let registry = ToolRegistry::new(backend.clone());
        let result = registry
            .call_tool("verify_otp", serde_json::json!({ "otp_code": "1234" }))
            .await
            .unwrap();

        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["success"], false);
        assert!(
            result["structuredContent"]["error"]
                .as_str()
                .unwrap()
                .contains("user_id")
        );
        assert!(backend.requests().is_empty());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_user_tool_wrong_type_keeps_envelope_shape() {
        let registry = ToolRegistry::new(test_backend());
        let result = registry
            .call_tool("toggle_sound", serde_json::json!({ "access_token": "tok", "sound": [1] }))
            .await
            .unwrap();

        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["success"], false);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = ToolRegistry::new(test_backend());
        let result = registry.call_tool("unknown", serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
