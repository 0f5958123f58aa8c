//! Result envelopes returned by every tool.
//!
//! A tool result always carries exactly one of a success payload or an error
//! message. Two shapes are in use:
//!
//! - [`Envelope`]: `{success, data?, message?, error?, payload?}` (auth, user)
//! - [`StatusEnvelope`]: `{status: "success" | "error", ..., message?}` (whistle)
//!
//! Both are delivered to MCP clients through [`structured_result`].

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::error::ToolError;

/// `success`-keyed envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Payload that was about to be sent when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Successful call carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            payload: None,
        }
    }

    /// Successful call carrying only a message.
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            payload: None,
        }
    }

    /// Failed call.
    pub fn failure(error: &ToolError) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.to_string()),
            payload: None,
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Echo the attempted payload back (failures only).
    pub fn with_payload(mut self, payload: Option<Value>) -> Self {
        if !self.success {
            self.payload = payload;
        }
        self
    }

    /// Convert into an MCP tool result.
    pub fn into_result(self) -> CallToolResult {
        let is_error = !self.success;
        structured_result(&self, is_error)
    }
}

/// Value of the `status` key of a [`StatusEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// `status`-keyed envelope with tool-specific top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub status: EnvelopeStatus,

    #[serde(flatten)]
    pub fields: Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusEnvelope {
    /// Empty successful envelope; add fields with [`field`](Self::field).
    pub fn success() -> Self {
        Self {
            status: EnvelopeStatus::Success,
            fields: Map::new(),
            message: None,
        }
    }

    /// Failed call.
    pub fn failure(error: &ToolError) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            fields: Map::new(),
            message: Some(error.to_string()),
        }
    }

    /// Add a top-level field.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Convert into an MCP tool result.
    pub fn into_result(self) -> CallToolResult {
        let is_error = !self.is_success();
        structured_result(&self, is_error)
    }
}

/// Build a tool result whose structured content is `value` and whose text
/// content is the same value serialized as JSON.
pub fn structured_result<T: Serialize>(value: &T, is_error: bool) -> CallToolResult {
    match serde_json::to_value(value) {
        Ok(structured) => CallToolResult {
            content: vec![Content::text(structured.to_string())],
            structured_content: Some(structured),
            is_error: Some(is_error),
            meta: None,
        },
        Err(e) => {
            warn!("Failed to serialize tool result: {}", e);
            CallToolResult::error(vec![Content::text(format!(
                "Failed to serialize tool result: {}",
                e
            ))])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::error::ValidationError;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(Envelope::success(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_failure_envelope_has_error_only() {
        let err = ToolError::from(ValidationError::NoUpdatesProvided);
        let value = serde_json::to_value(Envelope::failure(&err)).unwrap();
        assert_eq!(value, json!({"success": false, "error": "No updates provided"}));
    }

    #[test]
    fn test_payload_only_echoed_on_failure() {
        let ok = Envelope::success(json!({})).with_payload(Some(json!({"visible": "true"})));
        assert!(ok.payload.is_none());

        let failed = Envelope::failure(&ToolError::unexpected("x"))
            .with_payload(Some(json!({"visible": "true"})));
        assert_eq!(failed.payload, Some(json!({"visible": "true"})));
    }

    #[test]
    fn test_status_envelope_flattens_fields() {
        let envelope = StatusEnvelope::success()
            .field("whistle", json!({"id": "w1"}))
            .field("matching_whistles", json!([]));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"status": "success", "whistle": {"id": "w1"}, "matching_whistles": []})
        );
    }

    #[test]
    fn test_status_failure() {
        let envelope = StatusEnvelope::failure(&ToolError::not_found("Whistle w1 not found"));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "message": "Whistle w1 not found"})
        );
    }

    #[test]
    fn test_into_result_marks_errors() {
        let result = Envelope::failure(&ToolError::authentication_required()).into_result();
        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["success"], false);

        let result = StatusEnvelope::success().into_result();
        assert_eq!(result.is_error, Some(false));
    }
}
