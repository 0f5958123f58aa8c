//! OTP verification tool definition.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, reject_envelope, require_text, string_or_number,
};
use crate::domains::tools::envelope::Envelope;
use crate::domains::tools::error::{ToolError, ValidationError};

const ENDPOINT: &str = "/twilio/verify-otp";

static OTP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,8}$").expect("valid OTP regex"));

/// Parameters for the OTP verification tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VerifyOtpParams {
    /// The code received by SMS (4 to 8 digits).
    #[serde(deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub otp_code: String,

    /// The `user_id` returned by sign_in (not the phone number).
    pub user_id: String,
}

/// OTP verification tool - exchanges the SMS code for a session.
pub struct VerifyOtpTool;

impl VerifyOtpTool {
    pub const NAME: &'static str = "verify_otp";

    pub const DESCRIPTION: &'static str = "Verify the one-time password sent by sign_in. Requires the user_id returned by sign_in; returns the authenticated session including the access token.";

    #[instrument(skip_all, fields(user_id = %params.user_id))]
    pub async fn execute(params: &VerifyOtpParams, backend: &dyn BackendApi) -> Envelope {
        match Self::verify(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ ToolError::Validation(_)) => {
                warn!("OTP verification rejected: {}", e);
                Envelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "OTP verification failed: {}", e);
                Envelope::failure(&e)
            }
        }
    }

    async fn verify(params: &VerifyOtpParams, backend: &dyn BackendApi) -> Result<Envelope, ToolError> {
        let otp = params.otp_code.trim();
        if !OTP_RE.is_match(otp) {
            return Err(ValidationError::InvalidFormat("OTP code must be 4 to 8 digits".to_string()).into());
        }
        let user_id = validate_user_id(&params.user_id)?;

        let payload = json!({ "id": user_id, "otp": otp });
        debug!(payload = %json!({ "id": user_id, "otp": "***" }), "Sending OTP verification");

        let body = backend
            .request(BackendRequest::post(ENDPOINT).json(payload))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        info!("OTP verified");
        Ok(Envelope::success(body).with_message("OTP verified successfully"))
    }

    pub async fn run(params: VerifyOtpParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        backend: Arc<dyn BackendApi>,
    ) -> Result<serde_json::Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<VerifyOtpParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Verify OTP".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}

/// Reject user ids that look like phone numbers.
///
/// Clients often pass the phone number they just signed in with; the backend
/// wants the opaque id returned by sign_in. An id starting with `+` or made of
/// digits only is treated as a phone number.
pub(super) fn validate_user_id(raw: &str) -> Result<String, ValidationError> {
    let user_id = require_text("user_id", raw)?;
    if user_id.starts_with('+') || user_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid(
            "user_id",
            "looks like a phone number; use the user_id returned by sign_in",
        ));
    }
    Ok(user_id)
}
