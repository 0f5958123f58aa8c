//! Whistle update tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::fields::{WhistleUpdate, compose_update, normalize_whistle_record, validate_whistle_id};
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, is_not_found, optional_access_token, reject_status,
};
use crate::domains::tools::envelope::StatusEnvelope;
use crate::domains::tools::error::ToolError;

/// Parameters for the whistle update tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateWhistleParams {
    /// Id of the whistle to update.
    pub whistle_id: String,

    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Fields to change; omitted fields keep their current value.
    #[serde(flatten)]
    pub changes: WhistleUpdate,
}

pub struct UpdateWhistleTool;

impl UpdateWhistleTool {
    pub const NAME: &'static str = "update_whistle";

    pub const DESCRIPTION: &'static str = "Update fields of an existing whistle. Only the fields passed are changed; location is [longitude, latitude].";

    #[instrument(skip_all, fields(whistle_id = %params.whistle_id))]
    pub async fn execute(params: &UpdateWhistleParams, backend: &dyn BackendApi) -> StatusEnvelope {
        match Self::update(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ (ToolError::Validation(_) | ToolError::AuthenticationRequired(_))) => {
                warn!("Whistle update rejected: {}", e);
                StatusEnvelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "Whistle update failed: {}", e);
                StatusEnvelope::failure(&e)
            }
        }
    }

    async fn update(params: &UpdateWhistleParams, backend: &dyn BackendApi) -> Result<StatusEnvelope, ToolError> {
        let whistle_id = validate_whistle_id(&params.whistle_id)?;
        let token = optional_access_token(params.access_token.as_deref())?;
        let payload = Value::Object(compose_update(&params.changes)?);
        debug!(payload = %payload, "Sending whistle update");

        let endpoint = format!("/whistle/{}", whistle_id);
        let body = backend
            .request(
                BackendRequest::put(endpoint.as_str())
                    .maybe_authorization(token)
                    .json(payload),
            )
            .await
            .and_then(|body| ensure_backend_success(&endpoint, &body).map(|()| body))
            .map_err(|e| {
                if is_not_found(&e) {
                    ToolError::not_found(format!("Whistle {} not found", whistle_id))
                } else {
                    ToolError::from(e)
                }
            })?;

        let whistle = match body {
            Value::Object(mut map) if map.get("whistle").is_some_and(|w| !w.is_null()) => {
                map.remove("whistle").unwrap_or(Value::Null)
            }
            other => other,
        };

        info!("Whistle updated");
        Ok(StatusEnvelope::success()
            .field("whistle", normalize_whistle_record(whistle))
            .with_message("Whistle updated successfully"))
    }

    pub async fn run(params: UpdateWhistleParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(arguments: Value, backend: Arc<dyn BackendApi>) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_status).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<UpdateWhistleParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Update whistle".into()),
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
    use serde_json::json;

    fn params(arguments: Value) -> UpdateWhistleParams {
        serde_json::from_value(arguments).unwrap()
    }

    #[tokio::test]
    async fn test_update_sends_sparse_payload() {
        let backend = StubBackend::ok(json!({"whistle": {"_id": "w1", "alertRadius": 5.0}}));
        let p = params(json!({
            "whistle_id": "w1",
            "access_token": "tok",
            "alert_radius": 5.0,
            "sub_category": "electrician",
            "location": [76.961, 10.997]
        }));

        let envelope = UpdateWhistleTool::execute(&p, &backend).await;
        assert!(envelope.is_success());
        assert_eq!(envelope.fields["whistle"]["id"], "w1");

        let request = backend.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.endpoint, "/whistle/w1");
        assert_eq!(request.access_token.as_deref(), Some("tok"));
        assert_eq!(
            request.body,
            Some(json!({
                "alertRadius": 5.0,
                "subCategory": "electrician",
                "location": {"type": "Point", "coordinates": [76.961, 10.997]}
            }))
        );
    }

    #[tokio::test]
    async fn test_update_without_fields() {
        let backend = StubBackend::ok(json!({}));
        let envelope = UpdateWhistleTool::execute(&params(json!({"whistle_id": "w1"})), &backend).await;

        assert_eq!(envelope.message.as_deref(), Some("No updates provided"));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_tag_limit() {
        let backend = StubBackend::ok(json!({}));
        let tags: Vec<String> = (0..21).map(|i| format!("t{i}")).collect();
        let envelope =
            UpdateWhistleTool::execute(&params(json!({"whistle_id": "w1", "tags": tags})), &backend).await;

        assert!(envelope.message.unwrap().contains("up to 20 tags"));
    }

    #[tokio::test]
    async fn test_update_token_is_optional_but_checked() {
        let backend = StubBackend::ok(json!({}));

        let p = params(json!({"whistle_id": "w1", "active": true}));
        assert!(UpdateWhistleTool::execute(&p, &backend).await.is_success());
        assert_eq!(backend.last_request().access_token, None);

        let p = params(json!({"whistle_id": "w1", "active": true, "access_token": "a b"}));
        assert!(!UpdateWhistleTool::execute(&p, &backend).await.is_success());
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_whistle() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 404,
            endpoint: "/whistle/w404".to_string(),
            message: "Cannot find".to_string(),
        });
        let p = params(json!({"whistle_id": "w404", "description": "x"}));

        let envelope = UpdateWhistleTool::execute(&p, &backend).await;
        assert_eq!(envelope.message.as_deref(), Some("Whistle w404 not found"));
    }
}
