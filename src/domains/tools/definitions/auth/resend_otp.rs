//! OTP resend tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use super::verify_otp::validate_user_id;
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{backend_route, ensure_backend_success, reject_envelope};
use crate::domains::tools::envelope::Envelope;
use crate::domains::tools::error::ToolError;

const ENDPOINT: &str = "/twilio/resend-otp";

/// Parameters for the OTP resend tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResendOtpParams {
    /// The `user_id` returned by sign_in.
    pub user_id: String,
}

pub struct ResendOtpTool;

impl ResendOtpTool {
    pub const NAME: &'static str = "resend_otp";

    pub const DESCRIPTION: &'static str =
        "Send a new one-time password to the phone number of a user that already called sign_in.";

    #[instrument(skip_all, fields(user_id = %params.user_id))]
    pub async fn execute(params: &ResendOtpParams, backend: &dyn BackendApi) -> Envelope {
        match Self::resend(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ ToolError::Validation(_)) => {
                warn!("OTP resend rejected: {}", e);
                Envelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "OTP resend failed: {}", e);
                Envelope::failure(&e)
            }
        }
    }

    async fn resend(params: &ResendOtpParams, backend: &dyn BackendApi) -> Result<Envelope, ToolError> {
        let user_id = validate_user_id(&params.user_id)?;

        let body = backend
            .request(BackendRequest::post(ENDPOINT).json(json!({ "userid": user_id })))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("OTP sent successfully");
        info!("OTP resent");
        Ok(Envelope::acknowledged(message))
    }

    pub async fn run(params: ResendOtpParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: Value,
        backend: Arc<dyn BackendApi>,
    ) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ResendOtpParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Resend OTP".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}
