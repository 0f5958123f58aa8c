//! Masking of sensitive tool arguments before they reach the logs.

use serde_json::{Map, Value};
use tracing::info;

/// Mask an access token, keeping its last 4 characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 4 {
        format!("***{}", chars[chars.len() - 4..].iter().collect::<String>())
    } else {
        "***".to_string()
    }
}

/// Mask a phone number, keeping its first 2 and last 2 characters.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() > 4 {
        format!(
            "{}***{}",
            chars[..2].iter().collect::<String>(),
            chars[chars.len() - 2..].iter().collect::<String>()
        )
    } else {
        "***".to_string()
    }
}

/// Copy of `arguments` with `access_token`, `phone` and `otp_code` masked.
pub fn redact_arguments(arguments: &Map<String, Value>) -> Map<String, Value> {
    arguments
        .iter()
        .map(|(key, value)| {
            let masked = match (key.as_str(), value) {
                ("access_token", Value::String(token)) => Value::String(mask_token(token)),
                ("phone", Value::String(phone)) => Value::String(mask_phone(phone)),
                ("access_token" | "phone" | "otp_code", _) => Value::String("***".to_string()),
                _ => value.clone(),
            };
            (key.clone(), masked)
        })
        .collect()
}

/// Log an incoming tool call without leaking secrets.
pub fn log_tool_call(tool: &str, arguments: &Map<String, Value>) {
    let has_auth_token = arguments
        .get("access_token")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    let argument_keys: Vec<&str> = arguments.keys().map(String::as_str).collect();
    let redacted = serde_json::Value::Object(redact_arguments(arguments));

    info!(
        tool_name = tool,
        argument_keys = ?argument_keys,
        has_auth_token,
        arguments = %redacted,
        "Tool call started"
    );
}
