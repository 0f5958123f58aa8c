//! Whistle creation tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use super::expiry::{NEVER, validate_expiry};
use super::fields::{normalize_whistle_record, validate_tags};
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, reject_status, require_access_token, require_positive,
    require_text,
};
use crate::domains::tools::envelope::StatusEnvelope;
use crate::domains::tools::error::ToolError;

const ENDPOINT: &str = "/whistle";

fn default_alert_radius() -> f64 {
    2.0
}

fn default_expiry() -> String {
    NEVER.to_string()
}

/// Parameters for the whistle creation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateWhistleParams {
    /// Access token from verify_otp (required).
    #[serde(default)]
    pub access_token: Option<String>,

    /// What is needed or offered.
    pub description: String,

    /// Radius in kilometers within which matching users are alerted (default: 2.0).
    #[serde(default = "default_alert_radius")]
    pub alert_radius: f64,

    /// Keywords describing the whistle (at most 20).
    #[serde(default)]
    pub tags: Vec<String>,

    /// True when offering a service, false when looking for one (default).
    #[serde(default)]
    pub provider: bool,

    /// "never" (default) or a future date such as 2030-01-31 or 31/01/2030 18:00:00.
    #[serde(default = "default_expiry")]
    pub expiry: String,
}

/// Whistle creation tool.
pub struct CreateWhistleTool;

impl CreateWhistleTool {
    pub const NAME: &'static str = "create_whistle";

    pub const DESCRIPTION: &'static str = "Create a whistle: a request for, or offer of, a service around the user's location. Returns the created whistle and the whistles that already match it.";

    #[instrument(skip_all, fields(provider = params.provider, tags = params.tags.len()))]
    pub async fn execute(params: &CreateWhistleParams, backend: &dyn BackendApi) -> StatusEnvelope {
        match Self::create(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ (ToolError::Validation(_) | ToolError::AuthenticationRequired(_))) => {
                warn!("Whistle creation rejected: {}", e);
                StatusEnvelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "Whistle creation failed: {}", e);
                StatusEnvelope::failure(&e)
            }
        }
    }

    async fn create(params: &CreateWhistleParams, backend: &dyn BackendApi) -> Result<StatusEnvelope, ToolError> {
        let token = require_access_token(params.access_token.as_deref())?;
        let description = require_text("description", &params.description)?;
        let alert_radius = require_positive("alert_radius", params.alert_radius)?;
        let tags = validate_tags(&params.tags)?;
        let expiry = validate_expiry(&params.expiry)?;

        let payload = json!({
            "description": description,
            "alertRadius": alert_radius,
            "tags": tags,
            "provider": params.provider,
            "expiry": expiry,
            "active": true,
        });
        debug!(payload = %payload, "Sending whistle creation");

        let body = backend
            .request(BackendRequest::post(ENDPOINT).authorization(token).json(payload))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        let matching = body
            .get("matchingWhistles")
            .filter(|m| !m.is_null())
            .cloned()
            .unwrap_or_else(|| json!([]));
        let whistle = match body {
            Value::Object(mut map) if map.get("whistle").is_some_and(|w| !w.is_null()) => {
                map.remove("whistle").unwrap_or(Value::Null)
            }
            other => other,
        };
        let whistle = normalize_whistle_record(whistle);

        info!(whistle_id = ?whistle.get("id"), "Whistle created");
        Ok(StatusEnvelope::success()
            .field("whistle", whistle)
            .field("matching_whistles", matching))
    }

    pub async fn run(params: CreateWhistleParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
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
            input_schema: schema_for_type::<CreateWhistleParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Create whistle".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_status)
    }
}
