//! Helpers shared by every tool definition.
//!
//! Route construction, argument decoding, access-token checks and a few
//! lenient JSON accessors used when reshaping backend payloads.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{CallToolResult, Tool},
};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::core::backend::{BackendApi, BackendError};
use crate::domains::tools::envelope::{Envelope, StatusEnvelope};
use crate::domains::tools::error::{ToolError, ValidationError};
use crate::domains::tools::redact::log_tool_call;

/// Default limit for search results.
pub fn default_limit() -> usize {
    100
}

/// Validate and clamp limit to allowed range (1-100).
pub fn validate_limit(limit: usize) -> usize {
    limit.clamp(1, 100)
}

// ============================================================================
// Routing
// ============================================================================

/// Create a ToolRoute for STDIO transport from a tool's async runner.
///
/// The runner receives the decoded parameters and the shared backend; the
/// route logs the (redacted) call and its duration. Arguments that do not
/// decode are answered by `reject` in the tool's own result shape.
pub fn backend_route<S, P, F, Fut>(
    tool: Tool,
    backend: Arc<dyn BackendApi>,
    run: F,
    reject: RejectFn,
) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
    P: DeserializeOwned + Send + 'static,
    F: Fn(P, Arc<dyn BackendApi>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = CallToolResult> + Send + 'static,
{
    let name = tool.name.clone();
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let backend = backend.clone();
        let run = run.clone();
        let name = name.clone();
        async move {
            log_tool_call(&name, &args);
            let started = Instant::now();
            let result = decode_and_run(Value::Object(args), backend, run, reject).await;
            info!(
                tool_name = %name,
                execution_time_ms = started.elapsed().as_millis() as u64,
                success = !result.is_error.unwrap_or(false),
                "Tool call completed"
            );
            Ok::<CallToolResult, McpError>(result)
        }
        .boxed()
    })
}

/// Builds a tool's failure result for arguments that could not be decoded.
///
/// Receives the raw arguments so partial context can be echoed back.
pub type RejectFn = fn(&Value, ValidationError) -> CallToolResult;

/// Decode tool arguments into a parameter struct.
///
/// `null` is treated as an empty argument object.
pub fn decode_params<P: DeserializeOwned>(arguments: &Value) -> Result<P, ValidationError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(arguments).map_err(|e| ValidationError::InvalidArguments(e.to_string()))
}

/// Decode the arguments and run the tool, or answer with its rejection.
pub async fn decode_and_run<P, F, Fut>(
    arguments: Value,
    backend: Arc<dyn BackendApi>,
    run: F,
    reject: RejectFn,
) -> CallToolResult
where
    P: DeserializeOwned,
    F: FnOnce(P, Arc<dyn BackendApi>) -> Fut,
    Fut: Future<Output = CallToolResult>,
{
    match decode_params::<P>(&arguments) {
        Ok(params) => run(params, backend).await,
        Err(e) => {
            warn!("Tool arguments rejected: {}", e);
            reject(&arguments, e)
        }
    }
}

/// Failure result for tools answering with an [`Envelope`].
pub fn reject_envelope(_arguments: &Value, error: ValidationError) -> CallToolResult {
    Envelope::failure(&ToolError::from(error)).into_result()
}

/// Failure result for tools answering with a [`StatusEnvelope`].
pub fn reject_status(_arguments: &Value, error: ValidationError) -> CallToolResult {
    StatusEnvelope::failure(&ToolError::from(error)).into_result()
}

/// Serialize a tool result for the HTTP transport.
#[cfg(feature = "http")]
pub fn result_to_value(result: &CallToolResult) -> Result<Value, String> {
    serde_json::to_value(result).map_err(|e| e.to_string())
}

// ============================================================================
// Input validation
// ============================================================================

/// Require a well-formed access token.
///
/// Blank tokens, and tokens with embedded whitespace other than a leading
/// `Bearer ` scheme, are rejected.
pub fn require_access_token(token: Option<&str>) -> Result<&str, ToolError> {
    let token = token.map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(ToolError::authentication_required());
    }

    let credential = token.strip_prefix("Bearer ").unwrap_or(token).trim_start();
    if credential.is_empty() || credential.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ToolError::AuthenticationRequired(
            "Access token is malformed. Please sign in again.".to_string(),
        ));
    }

    Ok(token)
}

/// Validate an access token only when one was supplied.
pub fn optional_access_token(token: Option<&str>) -> Result<Option<&str>, ToolError> {
    match token {
        Some(t) if !t.trim().is_empty() => require_access_token(Some(t)).map(Some),
        _ => Ok(None),
    }
}

/// Require a non-blank string field, returning it trimmed.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Require a finite, strictly positive number.
pub fn require_positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::invalid(field, format!("must be greater than 0 (got {})", value)))
    }
}

/// Check latitude/longitude ranges.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::invalid(
            "latitude",
            format!("must be between -90 and 90 (got {})", latitude),
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::invalid(
            "longitude",
            format!("must be between -180 and 180 (got {})", longitude),
        ));
    }
    Ok(())
}

/// Fail when a 2xx payload carries `success: false`.
pub fn ensure_backend_success(endpoint: &str, body: &Value) -> Result<(), BackendError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("request was not successful")
            .to_string();
        return Err(BackendError::Rejected {
            endpoint: endpoint.to_string(),
            message,
        });
    }
    Ok(())
}

/// Whether a backend failure means the addressed resource does not exist.
pub fn is_not_found(error: &BackendError) -> bool {
    error.status() == Some(404) || error.message().to_lowercase().contains("not found")
}

// ============================================================================
// Lenient JSON access
// ============================================================================

/// First of `keys` present in `object` with a non-null value.
pub fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Remove every one of `keys` from `object`, returning the first non-null
/// value among them.
pub fn take_first(object: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| object.remove(*key))
        .fold(None, |found, value| found.or((!value.is_null()).then_some(value)))
}

/// Render an identifier as a string.
///
/// Accepts strings, numbers and Mongo extended-JSON `{"$oid": "..."}`.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Read a number, accepting numeric strings.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Deserialize a string field that clients sometimes send as a number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    match Raw::deserialize(deserializer) {
        Ok(Raw::Text(s)) => Ok(s),
        Ok(Raw::Number(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom("expected a string or a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;
    use serde_json::json;

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(10), 10);
        assert_eq!(validate_limit(0), 1);
        assert_eq!(validate_limit(200), 100);
    }

    #[derive(Debug, Deserialize)]
    struct Pin {
        label: String,
        #[serde(default)]
        pinned: bool,
    }

    async fn echo_label(pin: Pin, _backend: Arc<dyn BackendApi>) -> CallToolResult {
        Envelope::acknowledged(pin.label).into_result()
    }

    #[test]
    fn test_decode_params() {
        let pin: Pin = decode_params(&json!({"label": "home"})).unwrap();
        assert_eq!(pin.label, "home");
        assert!(!pin.pinned);

        let missing = decode_params::<Pin>(&Value::Null).unwrap_err();
        assert!(matches!(missing, ValidationError::InvalidArguments(_)));
        assert!(missing.to_string().contains("label"));
    }

    #[tokio::test]
    async fn test_decode_and_run_rejects_in_tool_shape() {
        let backend: Arc<dyn BackendApi> = Arc::new(StubBackend::ok(json!({})));

        let ok =
            decode_and_run(json!({"label": "home"}), backend.clone(), echo_label, reject_envelope)
                .await;
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(ok.structured_content.unwrap()["message"], "home");

        let rejected =
            decode_and_run(json!({"pinned": "yes"}), backend, echo_label, reject_status).await;
        assert_eq!(rejected.is_error, Some(true));
        let structured = rejected.structured_content.unwrap();
        assert_eq!(structured["status"], "error");
        assert!(structured["message"].as_str().unwrap().starts_with("Invalid arguments"));
    }

    #[test]
    fn test_require_access_token() {
        assert_eq!(require_access_token(Some(" abc.def ")).unwrap(), "abc.def");
        assert_eq!(require_access_token(Some("Bearer abc")).unwrap(), "Bearer abc");
        assert!(matches!(
            require_access_token(None),
            Err(ToolError::AuthenticationRequired(_))
        ));
        assert!(matches!(
            require_access_token(Some("   ")),
            Err(ToolError::AuthenticationRequired(_))
        ));
        assert!(matches!(
            require_access_token(Some("abc def")),
            Err(ToolError::AuthenticationRequired(_))
        ));
    }

    #[test]
    fn test_optional_access_token() {
        assert_eq!(optional_access_token(None).unwrap(), None);
        assert_eq!(optional_access_token(Some("")).unwrap(), None);
        assert_eq!(optional_access_token(Some("tok")).unwrap(), Some("tok"));
        assert!(optional_access_token(Some("to k")).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(37.7749, -122.4194).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("radius", 2.5), Ok(2.5));
        assert!(require_positive("radius", 0.0).is_err());
        assert!(require_positive("radius", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_backend_success() {
        assert!(ensure_backend_success("/x", &json!({"success": true})).is_ok());
        assert!(ensure_backend_success("/x", &json!({"user": {}})).is_ok());
        let err = ensure_backend_success("/x", &json!({"success": false, "message": "Invalid OTP"}))
            .unwrap_err();
        assert_eq!(err.message(), "Invalid OTP");
    }

    #[test]
    fn test_is_not_found() {
        let by_status = BackendError::Status {
            status: 404,
            endpoint: "/whistle/1".to_string(),
            message: "gone".to_string(),
        };
        let by_message = BackendError::Status {
            status: 400,
            endpoint: "/whistle/1".to_string(),
            message: "Whistle Not Found".to_string(),
        };
        let other = BackendError::transport("/whistle/1", "timeout");
        assert!(is_not_found(&by_status));
        assert!(is_not_found(&by_message));
        assert!(!is_not_found(&other));
    }

    #[test]
    fn test_first_present_skips_null() {
        let object = json!({"name": null, "title": "Plumber"});
        let object = object.as_object().unwrap();
        assert_eq!(first_present(object, &["name", "title"]), Some(&json!("Plumber")));
        assert_eq!(first_present(object, &["missing"]), None);
    }

    #[test]
    fn test_first_present_keeps_zero() {
        let object = json!({"latitude": 0.0, "lat": 12.0});
        let object = object.as_object().unwrap();
        assert_eq!(first_present(object, &["latitude", "lat"]), Some(&json!(0.0)));
    }

    #[test]
    fn test_take_first_removes_aliases() {
        let mut object = json!({"_id": null, "id": "u1", "name": "Asha"});
        let object = object.as_object_mut().unwrap();
        assert_eq!(take_first(object, &["_id", "id"]), Some(json!("u1")));
        assert!(!object.contains_key("_id") && !object.contains_key("id"));
        assert_eq!(take_first(object, &["_id", "id"]), None);
        assert!(object.contains_key("name"));
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_string(&json!(42)), Some("42".to_string()));
        assert_eq!(id_string(&json!({"$oid": "65f0"})), Some("65f0".to_string()));
        assert_eq!(id_string(&json!([1])), None);
    }

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(&json!(1.5)), Some(1.5));
        assert_eq!(lenient_f64(&json!(" 2.25 ")), Some(2.25));
        assert_eq!(lenient_f64(&json!("far")), None);
        assert_eq!(lenient_f64(&json!(true)), None);
    }

    #[test]
    fn test_string_or_number() {
        #[derive(Deserialize)]
        struct Otp {
            #[serde(deserialize_with = "string_or_number")]
            code: String,
        }

        let from_text: Otp = serde_json::from_value(json!({"code": "0421"})).unwrap();
        assert_eq!(from_text.code, "0421");
        let from_number: Otp = serde_json::from_value(json!({"code": 671536})).unwrap();
        assert_eq!(from_number.code, "671536");
        assert!(serde_json::from_value::<Otp>(json!({"code": [1]})).is_err());
    }
}
