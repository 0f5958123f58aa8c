//! Whistle listing tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::fields::normalize_whistle_record;
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, reject_status, require_access_token, take_first,
};
use crate::domains::tools::envelope::StatusEnvelope;
use crate::domains::tools::error::ToolError;

const ENDPOINT: &str = "/whistles";

/// Parameters for the whistle listing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListWhistlesParams {
    /// Access token from verify_otp (required).
    #[serde(default)]
    pub access_token: Option<String>,

    /// Only return active whistles.
    #[serde(default)]
    pub active_only: bool,
}

pub struct ListWhistlesTool;

impl ListWhistlesTool {
    pub const NAME: &'static str = "list_whistles";

    pub const DESCRIPTION: &'static str =
        "List the signed-in user's whistles. Set active_only=true to hide deactivated ones.";

    #[instrument(skip_all, fields(active_only = params.active_only))]
    pub async fn execute(params: &ListWhistlesParams, backend: &dyn BackendApi) -> StatusEnvelope {
        match Self::list(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ ToolError::AuthenticationRequired(_)) => {
                warn!("Whistle listing rejected: {}", e);
                StatusEnvelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "Whistle listing failed: {}", e);
                StatusEnvelope::failure(&e)
            }
        }
    }

    async fn list(params: &ListWhistlesParams, backend: &dyn BackendApi) -> Result<StatusEnvelope, ToolError> {
        let token = require_access_token(params.access_token.as_deref())?;

        let body = backend
            .request(BackendRequest::get(ENDPOINT).authorization(token))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        let whistles: Vec<Value> = whistle_records(body)?
            .into_iter()
            .map(normalize_whistle_record)
            .filter(|w| !params.active_only || w.get("active") != Some(&Value::Bool(false)))
            .collect();

        info!(count = whistles.len(), "Whistles listed");
        Ok(StatusEnvelope::success().field("whistles", Value::Array(whistles)))
    }

    pub async fn run(params: ListWhistlesParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
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
            input_schema: schema_for_type::<ListWhistlesParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("List whistles".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_status)
    }
}

/// Extract the whistle list from a bare list or a `{whistles}`/`{Whistles}` object.
fn whistle_records(body: Value) -> Result<Vec<Value>, ToolError> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match take_first(&mut map, &["whistles", "Whistles"]) {
            Some(Value::Array(records)) => Ok(records),
            None => Ok(Vec::new()),
            Some(_) => Err(ToolError::unexpected("whistles are not a list")),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(ToolError::unexpected("unexpected whistle list payload")),
    }
}
