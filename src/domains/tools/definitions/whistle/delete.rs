//! Whistle deletion tool definition.
//!
//! Deletion is soft: the whistle is deactivated with `active: false` and stays
//! on the backend.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use super::fields::validate_whistle_id;
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, is_not_found, optional_access_token, reject_status,
};
use crate::domains::tools::envelope::StatusEnvelope;
use crate::domains::tools::error::ToolError;

/// Parameters for the whistle deletion tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteWhistleParams {
    /// Id of the whistle to delete.
    pub whistle_id: String,

    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,
}

pub struct DeleteWhistleTool;

impl DeleteWhistleTool {
    pub const NAME: &'static str = "delete_whistle";

    pub const DESCRIPTION: &'static str =
        "Delete a whistle. The whistle is deactivated so it no longer matches or alerts anyone.";

    #[instrument(skip_all, fields(whistle_id = %params.whistle_id))]
    pub async fn execute(params: &DeleteWhistleParams, backend: &dyn BackendApi) -> StatusEnvelope {
        match Self::delete(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ (ToolError::Validation(_) | ToolError::AuthenticationRequired(_) | ToolError::NotFound(_))) => {
                warn!("Whistle deletion rejected: {}", e);
                StatusEnvelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "Whistle deletion failed: {}", e);
                StatusEnvelope::failure(&e)
            }
        }
    }

    async fn delete(params: &DeleteWhistleParams, backend: &dyn BackendApi) -> Result<StatusEnvelope, ToolError> {
        let whistle_id = validate_whistle_id(&params.whistle_id)?;
        let token = optional_access_token(params.access_token.as_deref())?;

        let endpoint = format!("/whistle/{}", whistle_id);
        backend
            .request(
                BackendRequest::put(endpoint.as_str())
                    .maybe_authorization(token)
                    .json(json!({ "active": false })),
            )
            .await
            .and_then(|body| ensure_backend_success(&endpoint, &body))
            .map_err(|e| {
                if is_not_found(&e) {
                    ToolError::not_found(format!("Whistle {} not found", whistle_id))
                } else {
                    ToolError::from(e)
                }
            })?;

        info!("Whistle deactivated");
        Ok(StatusEnvelope::success().with_message(format!("Whistle {} deleted successfully", whistle_id)))
    }

    pub async fn run(params: DeleteWhistleParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        backend: Arc<dyn BackendApi>,
    ) -> Result<serde_json::Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_status).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<DeleteWhistleParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Delete whistle".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;
    use crate::core::backend::BackendError;
    use reqwest::Method;

    fn params(whistle_id: &str) -> DeleteWhistleParams {
        DeleteWhistleParams {
            whistle_id: whistle_id.to_string(),
            access_token: Some("tok".to_string()),
        }
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let backend = StubBackend::ok(json!({"whistle": {"_id": "w1", "active": false}}));
        let envelope = DeleteWhistleTool::execute(&params("w1"), &backend).await;

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "success", "message": "Whistle w1 deleted successfully"})
        );

        let request = backend.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.endpoint, "/whistle/w1");
        assert_eq!(request.body, Some(json!({"active": false})));
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 400,
            endpoint: "/whistle/w2".to_string(),
            message: "Whistle not found".to_string(),
        });
        let envelope = DeleteWhistleTool::execute(&params("w2"), &backend).await;
        assert_eq!(envelope.message.as_deref(), Some("Whistle w2 not found"));
    }

    #[tokio::test]
    async fn test_not_found_in_rejected_body() {
        let backend = StubBackend::ok(json!({"success": false, "message": "whistle NOT FOUND"}));
        let envelope = DeleteWhistleTool::execute(&params("w3"), &backend).await;
        assert_eq!(envelope.message.as_deref(), Some("Whistle w3 not found"));
    }

    #[tokio::test]
    async fn test_other_failures_keep_backend_message() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 500,
            endpoint: "/whistle/w4".to_string(),
            message: "database unavailable".to_string(),
        });
        let envelope = DeleteWhistleTool::execute(&params("w4"), &backend).await;
        assert!(envelope.message.unwrap().contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_blank_id() {
        let backend = StubBackend::ok(json!({}));
        let envelope = DeleteWhistleTool::execute(&params(" "), &backend).await;
        assert_eq!(
            envelope.message.as_deref(),
            Some("Missing required field: whistle_id")
        );
        assert!(backend.requests().is_empty());
    }
}
