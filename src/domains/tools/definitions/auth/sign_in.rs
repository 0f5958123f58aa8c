//! Phone sign-in tool definition.
//!
//! Starts the OTP flow: the backend creates (or finds) the user and texts a
//! one-time code to the normalized phone number.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use super::phone::normalize_phone;
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, first_present, id_string, reject_envelope, require_text,
    string_or_number, validate_coordinates,
};
use crate::domains::tools::envelope::Envelope;
use crate::domains::tools::error::{ToolError, ValidationError};

const ENDPOINT: &str = "/twilio/sign-in";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the sign-in tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SignInParams {
    /// Phone number, national (`9994076214`) or international (`+919994076214`).
    /// Spaces, hyphens and parentheses are ignored.
    #[serde(deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub phone: String,

    /// Country calling code such as `+91`. Ignored when `phone` is international.
    pub country_code: String,

    /// Display name of the user.
    pub name: String,

    /// Current position as `[latitude, longitude]`.
    pub location: Vec<f64>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Sign-in tool - registers the phone number and sends an OTP.
pub struct SignInTool;

impl SignInTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sign_in";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Sign in with a phone number. Sends a one-time password (OTP) by SMS and returns the user record and its user_id, which verify_otp needs next.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(name = %params.name))]
    pub async fn execute(params: &SignInParams, backend: &dyn BackendApi) -> Envelope {
        match Self::sign_in(params, backend).await {
            Ok(envelope) => envelope,
            Err(e @ ToolError::Validation(_)) => {
                warn!("Sign-in rejected: {}", e);
                Envelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "Sign-in failed: {}", e);
                Envelope::failure(&e)
            }
        }
    }

    async fn sign_in(params: &SignInParams, backend: &dyn BackendApi) -> Result<Envelope, ToolError> {
        let normalized = normalize_phone(&params.phone, &params.country_code)?;
        let name = require_text("name", &params.name)?;
        let (latitude, longitude) = match params.location.as_slice() {
            [latitude, longitude] => (*latitude, *longitude),
            other => {
                return Err(ValidationError::invalid(
                    "location",
                    format!("expected [latitude, longitude], got {} values", other.len()),
                )
                .into());
            }
        };
        validate_coordinates(latitude, longitude)?;

        let payload = json!({
            "phone": normalized.phone,
            "countryCode": normalized.country_code,
            "name": name,
            "location": [latitude, longitude],
        });
        debug!(payload = %payload, "Sending sign-in request");

        let body = backend
            .request(BackendRequest::post(ENDPOINT).json(payload))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        let user = body.get("user").cloned().unwrap_or(Value::Null);
        let user_id = user
            .as_object()
            .and_then(|u| first_present(u, &["id", "_id"]))
            .and_then(id_string);

        info!(user_id = ?user_id, "Sign-in OTP sent");

        Ok(Envelope::success(json!({
            "user": user,
            "token": body.get("token").cloned().unwrap_or(Value::Null),
            "user_id": user_id,
        }))
        .with_message("OTP sent. Call verify_otp with the code and user_id."))
    }

    /// Run the tool and wrap the envelope as an MCP result.
    pub async fn run(params: SignInParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: Value,
        backend: Arc<dyn BackendApi>,
    ) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<SignInParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Sign in".into()),
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;
    use crate::core::backend::BackendError;
    use reqwest::Method;

    fn params(phone: &str, country_code: &str) -> SignInParams {
        SignInParams {
            phone: phone.to_string(),
            country_code: country_code.to_string(),
            name: "Test User".to_string(),
            location: vec![10.997, 76.961],
        }
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let backend = StubBackend::ok(json!({
            "user": {"_id": "687e16902de5f0ffb1884609", "name": "Test User"},
            "token": "tok-123"
        }));

        let envelope = SignInTool::execute(&params("9994076214", "+91"), &backend).await;
        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data["user_id"], "687e16902de5f0ffb1884609");
        assert_eq!(data["token"], "tok-123");

        let request = backend.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.endpoint, "/twilio/sign-in");
        assert_eq!(
            request.body,
            Some(json!({
                "phone": "9994076214",
                "countryCode": "+91",
                "name": "Test User",
                "location": [10.997, 76.961]
            }))
        );
    }

    #[tokio::test]
    async fn test_sign_in_prefers_id_over_object_id() {
        let backend = StubBackend::ok(json!({"user": {"id": "u1", "_id": "u2"}}));
        let envelope = SignInTool::execute(&params("9994076214", "+91"), &backend).await;
        assert_eq!(envelope.data.unwrap()["user_id"], "u1");
    }

    #[tokio::test]
    async fn test_international_number_overrides_country_code() {
        let backend = StubBackend::ok(json!({"user": {"_id": "u1"}}));
        SignInTool::execute(&params("+1 (415) 555-1234", "+91"), &backend).await;

        let body = backend.last_request().body.unwrap();
        assert_eq!(body["phone"], "4155551234");
        assert_eq!(body["countryCode"], "+1");
    }

    #[tokio::test]
    async fn test_invalid_phone_never_reaches_backend() {
        let backend = StubBackend::ok(json!({}));
        let envelope = SignInTool::execute(&params("99940abc", "+91"), &backend).await;

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().starts_with("Invalid format"));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let backend = StubBackend::ok(json!({}));
        let mut p = params("9994076214", "+91");
        p.name = "  ".to_string();

        let envelope = SignInTool::execute(&p, &backend).await;
        assert_eq!(envelope.error.as_deref(), Some("Missing required field: name"));
    }

    #[tokio::test]
    async fn test_location_shape_and_range() {
        let backend = StubBackend::ok(json!({}));

        let mut p = params("9994076214", "+91");
        p.location = vec![10.0];
        assert!(!SignInTool::execute(&p, &backend).await.success);

        p.location = vec![100.0, 10.0];
        assert!(!SignInTool::execute(&p, &backend).await.success);

        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_envelope() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 400,
            endpoint: ENDPOINT.to_string(),
            message: "Invalid phone number".to_string(),
        });
        let envelope = SignInTool::execute(&params("9994076214", "+91"), &backend).await;

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.error.unwrap().contains("Invalid phone number"));
    }

    #[tokio::test]
    async fn test_run_marks_error_result() {
        let backend: Arc<dyn BackendApi> = Arc::new(StubBackend::unreachable());
        let result = SignInTool::run(params("9994076214", "+91"), backend).await;
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_numeric_phone_is_accepted() {
        let p: SignInParams = serde_json::from_value(json!({
            "phone": 9994076214u64,
            "country_code": "+91",
            "name": "Test User",
            "location": [10.997, 76.961]
        }))
        .unwrap();
        assert_eq!(p.phone, "9994076214");
    }
}
