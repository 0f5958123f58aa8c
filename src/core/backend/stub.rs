//! Recording test double for [`BackendApi`].

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{BackendApi, BackendError, BackendRequest};

/// Backend that replays a canned outcome and records every request.
pub struct StubBackend {
    outcome: Result<Value, BackendError>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl StubBackend {
    /// A backend answering every request with `body`.
    pub fn ok(body: Value) -> Self {
        Self {
            outcome: Ok(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend failing every request with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose transport always fails.
    pub fn unreachable() -> Self {
        Self::failing(BackendError::transport("/", "connection refused"))
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> BackendRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn request(&self, request: BackendRequest) -> Result<Value, BackendError> {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}
