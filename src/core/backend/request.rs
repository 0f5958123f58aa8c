//! Backend request description.

use reqwest::Method;
use serde_json::Value;

/// A single request against the backend REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    /// HTTP method.
    pub method: Method,

    /// Endpoint path relative to the base URL (e.g. `/twilio/sign-in`).
    pub endpoint: String,

    /// JSON body, if any.
    pub body: Option<Value>,

    /// User access token, sent verbatim as the `Authorization` header.
    pub access_token: Option<String>,
}

impl BackendRequest {
    /// Create a request with the given method and endpoint.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            access_token: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the caller's access token.
    pub fn authorization(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Attach the caller's access token when one was supplied.
    pub fn maybe_authorization(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.authorization(token),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_parts() {
        let request = BackendRequest::put("/user")
            .json(json!({"visible": "true"}))
            .authorization("tok");

        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.endpoint, "/user");
        assert_eq!(request.body, Some(json!({"visible": "true"})));
        assert_eq!(request.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_maybe_authorization_none() {
        let request = BackendRequest::get("/whistles").maybe_authorization(None);
        assert!(request.access_token.is_none());
    }
}
