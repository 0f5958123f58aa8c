//! Tool Router - builds the rmcp ToolRouter for the STDIO transport.
//!
//! Each tool knows how to create its own route; the backend is handed to every
//! route at construction.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::backend::BackendApi;

use super::definitions::{
    CreateWhistleTool, DeleteWhistleTool, GetUserProfileTool, ListWhistlesTool, ResendOtpTool,
    SearchTool, SignInTool, ToggleSoundTool, ToggleTrackingTool, ToggleVisibilityTool,
    UpdateWhistleTool, VerifyOtpTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(backend: Arc<dyn BackendApi>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(SignInTool::create_route(backend.clone()))
        .with_route(VerifyOtpTool::create_route(backend.clone()))
        .with_route(ResendOtpTool::create_route(backend.clone()))
        .with_route(SearchTool::create_route(backend.clone()))
        .with_route(CreateWhistleTool::create_route(backend.clone()))
        .with_route(UpdateWhistleTool::create_route(backend.clone()))
        .with_route(DeleteWhistleTool::create_route(backend.clone()))
        .with_route(ListWhistlesTool::create_route(backend.clone()))
        .with_route(ToggleVisibilityTool::create_route(backend.clone()))
        .with_route(ToggleTrackingTool::create_route(backend.clone()))
        .with_route(ToggleSoundTool::create_route(backend.clone()))
        .with_route(GetUserProfileTool::create_route(backend))
}
