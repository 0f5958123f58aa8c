//! reqwest-based backend client.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{error, info};

use super::{BackendApi, BackendError, BackendRequest};
use crate::core::config::BackendConfig;

/// Endpoint served from the search base URL when one is configured.
const SEARCH_ENDPOINT: &str = "searchAround";

/// Upper bound on how much of a non-JSON error body is kept in messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Production backend client.
///
/// Wraps one `reqwest::Client` (connection pool included) that is shared by
/// every tool call.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    search_base_url: Option<String>,
    api_key: Option<String>,
}

impl HttpBackend {
    /// Build a client from the backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("whistle-mcp-server/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_base_url: config
                .search_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve the absolute URL for an endpoint.
    pub fn url_for(&self, endpoint: &str) -> String {
        let path = endpoint.trim_start_matches('/');
        let base = match &self.search_base_url {
            Some(search_base) if path.starts_with(SEARCH_ENDPOINT) => search_base,
            _ => &self.base_url,
        };
        format!("{}/{}", base, path)
    }

    /// Authorization header value for a request.
    ///
    /// A user access token is forwarded verbatim; otherwise the service API
    /// key is sent as a bearer token.
    fn authorization_for(&self, request: &BackendRequest) -> Option<String> {
        request
            .access_token
            .clone()
            .or_else(|| self.api_key.as_ref().map(|key| format!("Bearer {}", key)))
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn request(&self, request: BackendRequest) -> Result<Value, BackendError> {
        let url = self.url_for(&request.endpoint);
        let endpoint = request.endpoint.as_str();

        info!(
            method = %request.method,
            url = %url,
            has_data = request.body.is_some(),
            "Making API request"
        );

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(auth) = self.authorization_for(&request) {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(endpoint, error = %e, "API request error");
            if e.is_builder() {
                BackendError::InvalidRequest(e.to_string())
            } else {
                BackendError::transport(endpoint, e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(endpoint, error = %e, "Failed to read API response body");
            BackendError::transport(endpoint, e.to_string())
        })?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            error!(
                endpoint,
                status_code = status.as_u16(),
                response_text = %text,
                "API request failed"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            });
        }

        info!(endpoint, status_code = status.as_u16(), "API request successful");
        parse_body(endpoint, &text)
    }
}

/// Decode a successful response body. An empty body decodes to `null`.
fn parse_body(endpoint: &str, text: &str) -> Result<Value, BackendError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| BackendError::decode(endpoint, e.to_string()))
}

/// Extract a human-readable message from an error response body.
///
/// Prefers the JSON `message` or `error` field, falls back to the raw text.
fn error_message(text: &str) -> Option<String> {
    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(text) {
        for key in ["message", "error"] {
            if let Some(message) = body.get(key).and_then(Value::as_str) {
                return Some(message.to_string());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect())
    }
}
