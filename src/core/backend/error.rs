//! Backend error types.

use thiserror::Error;

/// Errors returned by a [`BackendApi`](super::BackendApi) call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("Backend returned HTTP {status} for {endpoint}: {message}")]
    Status {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The response body was not valid JSON.
    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The backend answered 2xx but reported `success: false`.
    #[error("Backend rejected request to {endpoint}: {message}")]
    Rejected { endpoint: String, message: String },

    /// The request could not be built (bad URL or header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Create a transport error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend-provided message, or the error text for local failures.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
