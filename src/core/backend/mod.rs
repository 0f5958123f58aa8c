//! Backend REST API access.
//!
//! Every tool issues exactly one request against the Whistle REST API. The
//! request goes through the [`BackendApi`] capability so tool handlers can be
//! exercised with a substitute client:
//!
//! - [`HttpBackend`]: the production client built on a shared `reqwest::Client`
//! - `StubBackend` (tests only): returns a canned response and records requests

mod client;
mod error;
mod request;

#[cfg(test)]
pub(crate) mod stub;

pub use client::HttpBackend;
pub use error::BackendError;
pub use request::BackendRequest;

use async_trait::async_trait;
use serde_json::Value;

/// Capability to execute a single request against the backend.
///
/// Implementations must be safe to share between concurrent tool calls.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Execute the request and return the decoded JSON body.
    ///
    /// Non-2xx responses and transport failures are returned as errors.
    async fn request(&self, request: BackendRequest) -> Result<Value, BackendError>;
}
