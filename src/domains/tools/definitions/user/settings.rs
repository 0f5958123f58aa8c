//! User settings toggle tools.
//!
//! Visibility, location tracking and notification sound are all boolean
//! settings of the user record, updated with `PUT /user` and a single
//! `"true"`/`"false"` string value.

use std::fmt;
use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, reject_envelope, require_access_token,
};
use crate::domains::tools::envelope::Envelope;
use crate::domains::tools::error::{ToolError, ValidationError};

const ENDPOINT: &str = "/user";

/// A boolean setting of the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSetting {
    Visible,
    Tracking,
    Sound,
}

impl UserSetting {
    /// Field name on the backend user record.
    pub fn key(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Tracking => "tracking",
            Self::Sound => "sound",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Visible => "visibility",
            Self::Tracking => "location tracking",
            Self::Sound => "notification sound",
        }
    }

    /// Send the new value to the backend and wrap the outcome.
    ///
    /// Failures that happen after the payload was built echo it back.
    #[instrument(skip_all, fields(setting = self.key(), value = %value))]
    pub async fn apply(self, access_token: Option<&str>, value: &str, backend: &dyn BackendApi) -> Envelope {
        let mut attempted = None;
        match self.update(access_token, value, backend, &mut attempted).await {
            Ok(envelope) => envelope,
            Err(e @ (ToolError::Validation(_) | ToolError::AuthenticationRequired(_))) => {
                warn!("Setting update rejected: {}", e);
                Envelope::failure(&e).with_payload(attempted)
            }
            Err(e) => {
                error!(kind = e.kind(), "Setting update failed: {}", e);
                Envelope::failure(&e).with_payload(attempted)
            }
        }
    }

    async fn update(
        self,
        access_token: Option<&str>,
        value: &str,
        backend: &dyn BackendApi,
        attempted: &mut Option<Value>,
    ) -> Result<Envelope, ToolError> {
        let token = require_access_token(access_token)?;
        let value = value.trim();
        if value != "true" && value != "false" {
            return Err(ValidationError::invalid(self.key(), "must be either 'true' or 'false'").into());
        }

        let mut payload = Map::new();
        payload.insert(self.key().to_string(), Value::String(value.to_string()));
        let payload = Value::Object(payload);
        *attempted = Some(payload.clone());
        debug!(payload = %payload, "Sending setting update");

        let body = backend
            .request(BackendRequest::put(ENDPOINT).authorization(token).json(payload))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        info!("User {} set to {}", self.label(), value);
        Ok(Envelope::success(body).with_message(format!("User {} set to {}", self.label(), value)))
    }
}

impl fmt::Display for UserSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accept `"true"`/`"false"` as text or as a JSON boolean.
fn bool_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
    }

    match Raw::deserialize(deserializer) {
        Ok(Raw::Text(s)) => Ok(s),
        Ok(Raw::Flag(b)) => Ok(b.to_string()),
        Err(_) => Err(de::Error::custom("expected \"true\" or \"false\"")),
    }
}

// ============================================================================
// toggle_visibility
// ============================================================================

/// Parameters for the visibility toggle.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ToggleVisibilityParams {
    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,

    /// "true" to be visible to other users, "false" to hide.
    #[serde(deserialize_with = "bool_text")]
    #[schemars(with = "String")]
    pub visible: String,
}

pub struct ToggleVisibilityTool;

impl ToggleVisibilityTool {
    pub const NAME: &'static str = "toggle_visibility";

    pub const DESCRIPTION: &'static str =
        "Show or hide the signed-in user to others. Pass visible=\"true\" or visible=\"false\".";

    pub async fn execute(params: &ToggleVisibilityParams, backend: &dyn BackendApi) -> Envelope {
        UserSetting::Visible
            .apply(params.access_token.as_deref(), &params.visible, backend)
            .await
    }

    pub async fn run(params: ToggleVisibilityParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(arguments: Value, backend: Arc<dyn BackendApi>) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ToggleVisibilityParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}

// ============================================================================
// toggle_tracking
// ============================================================================

/// Parameters for the location tracking toggle.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ToggleTrackingParams {
    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,

    /// "true" to share live location updates, "false" to stop.
    #[serde(deserialize_with = "bool_text")]
    #[schemars(with = "String")]
    pub tracking: String,
}

pub struct ToggleTrackingTool;

impl ToggleTrackingTool {
    pub const NAME: &'static str = "toggle_tracking";

    pub const DESCRIPTION: &'static str =
        "Turn location tracking on or off for the signed-in user. Pass tracking=\"true\" or tracking=\"false\".";

    pub async fn execute(params: &ToggleTrackingParams, backend: &dyn BackendApi) -> Envelope {
        UserSetting::Tracking
            .apply(params.access_token.as_deref(), &params.tracking, backend)
            .await
    }

    pub async fn run(params: ToggleTrackingParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(arguments: Value, backend: Arc<dyn BackendApi>) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ToggleTrackingParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}

// ============================================================================
// toggle_sound
// ============================================================================

/// Parameters for the notification sound toggle.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ToggleSoundParams {
    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,

    /// "true" to play a sound on alerts, "false" to mute.
    #[serde(deserialize_with = "bool_text")]
    #[schemars(with = "String")]
    pub sound: String,
}

pub struct ToggleSoundTool;

impl ToggleSoundTool {
    pub const NAME: &'static str = "toggle_sound";

    pub const DESCRIPTION: &'static str =
        "Mute or unmute alert sounds for the signed-in user. Pass sound=\"true\" or sound=\"false\".";

    pub async fn execute(params: &ToggleSoundParams, backend: &dyn BackendApi) -> Envelope {
        UserSetting::Sound
            .apply(params.access_token.as_deref(), &params.sound, backend)
            .await
    }

    pub async fn run(params: ToggleSoundParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(arguments: Value, backend: Arc<dyn BackendApi>) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ToggleSoundParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::stub::StubBackend;
    use crate::core::backend::BackendError;
    use reqwest::Method;
    use serde_json::json;

    fn visibility(token: Option<&str>, visible: &str) -> ToggleVisibilityParams {
        ToggleVisibilityParams {
            access_token: token.map(String::from),
            visible: visible.to_string(),
        }
    }

    #[tokio::test]
    async fn test_toggle_visibility_success() {
        let backend = StubBackend::ok(json!({"user": {"visible": "false"}}));
        let envelope = ToggleVisibilityTool::execute(&visibility(Some("tok-1234"), "false"), &backend).await;

        assert!(envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("User visibility set to false"));

        let request = backend.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.endpoint, "/user");
        assert_eq!(request.access_token.as_deref(), Some("tok-1234"));
        assert_eq!(request.body, Some(json!({"visible": "false"})));
    }

    #[tokio::test]
    async fn test_invalid_value_is_rejected() {
        let backend = StubBackend::ok(json!({}));
        let envelope = ToggleVisibilityTool::execute(&visibility(Some("tok"), "yes"), &backend).await;

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().contains("'true' or 'false'"));
        assert!(envelope.payload.is_none());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token() {
        let backend = StubBackend::ok(json!({}));
        for token in [None, Some(""), Some("  ")] {
            let envelope = ToggleVisibilityTool::execute(&visibility(token, "true"), &backend).await;
            assert_eq!(
                envelope.error.as_deref(),
                Some("Authentication required. Please sign in first.")
            );
        }
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_echoes_payload() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 401,
            endpoint: "/user".to_string(),
            message: "jwt expired".to_string(),
        });
        let envelope = ToggleVisibilityTool::execute(&visibility(Some("tok"), "true"), &backend).await;

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().contains("jwt expired"));
        assert_eq!(envelope.payload, Some(json!({"visible": "true"})));
    }

    #[tokio::test]
    async fn test_tracking_and_sound_keys() {
        let backend = StubBackend::ok(json!({}));

        let tracking = ToggleTrackingParams {
            access_token: Some("tok".to_string()),
            tracking: "true".to_string(),
        };
        ToggleTrackingTool::execute(&tracking, &backend).await;
        assert_eq!(backend.last_request().body, Some(json!({"tracking": "true"})));

        let sound = ToggleSoundParams {
            access_token: Some("tok".to_string()),
            sound: "false".to_string(),
        };
        let envelope = ToggleSoundTool::execute(&sound, &backend).await;
        assert_eq!(backend.last_request().body, Some(json!({"sound": "false"})));
        assert_eq!(envelope.message.as_deref(), Some("User notification sound set to false"));
    }

    #[test]
    fn test_boolean_argument_is_accepted() {
        let params: ToggleVisibilityParams =
            serde_json::from_value(json!({"access_token": "tok", "visible": true})).unwrap();
        assert_eq!(params.visible, "true");
        assert!(serde_json::from_value::<ToggleVisibilityParams>(json!({"visible": 1})).is_err());
    }

    #[test]
    fn test_setting_display() {
        assert_eq!(UserSetting::Tracking.to_string(), "tracking");
    }
}
