//! Tool-specific error types.
//!
//! Every failure a tool can hit falls into one of the kinds of [`ToolError`].
//! None of them leave the tool boundary: handlers convert them into a result
//! envelope (see [`envelope`](super::envelope)).

use thiserror::Error;

use crate::core::backend::BackendError;

/// Maximum number of tags a whistle may carry.
pub const MAX_TAGS: usize = 20;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Malformed input detected locally, before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The access token is missing or malformed.
    #[error("{0}")]
    AuthenticationRequired(String),

    /// The backend call failed (non-2xx, transport failure, bad payload).
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// The backend signalled that the resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything else.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ToolError {
    /// Create an "authentication required" error with the default message.
    pub fn authentication_required() -> Self {
        Self::AuthenticationRequired("Authentication required. Please sign in first.".to_string())
    }

    /// Create a "not found" error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an "unexpected" error.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Stable identifier of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::AuthenticationRequired(_) => "authentication_required",
            Self::Backend(_) => "backend_error",
            Self::NotFound(_) => "not_found",
            Self::Unexpected(_) => "unexpected_error",
        }
    }
}

/// Input validation failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// A phone number or country code does not have the expected shape.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No supported date format matched.
    #[error(
        "Could not parse date '{0}'. Use YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY or YYYY/MM/DD \
         (optionally followed by HH:MM:SS), an ISO-8601 timestamp, or 'never'"
    )]
    UnparseableDate(String),

    /// The expiry parsed but is not in the future.
    #[error("Expiry date must be in the future (got {0})")]
    ExpiryInPast(String),

    /// More tags than a whistle may carry.
    #[error("You can add up to {max} tags ({count} given)", max = MAX_TAGS)]
    TooManyTags { count: usize },

    /// A required field is absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but out of range or of the wrong shape.
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// The arguments do not decode into the tool's parameters (missing
    /// required field, wrong type).
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// An update call carried no field to change.
    #[error("No updates provided")]
    NoUpdatesProvided,
}

impl ValidationError {
    /// Create an "invalid value" error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_tags_message() {
        let err = ValidationError::TooManyTags { count: 21 };
        assert_eq!(err.to_string(), "You can add up to 20 tags (21 given)");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = ToolError::from(ValidationError::MissingField("description"));
        assert_eq!(err.to_string(), "Missing required field: description");
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_backend_error_keeps_message() {
        let err = ToolError::from(BackendError::Status {
            status: 500,
            endpoint: "/user".to_string(),
            message: "boom".to_string(),
        });
        assert_eq!(err.kind(), "backend_error");
        assert!(err.to_string().contains("boom"));
    }
}
