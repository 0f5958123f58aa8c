//! Error types and handling for the MCP server.
//!
//! This module defines the top-level error type used while bootstrapping the
//! server. Tool calls never surface these errors to clients: each tool maps
//! its own [`ToolError`](crate::domains::tools::ToolError) into a result
//! envelope at the tool boundary.

use thiserror::Error;

use super::backend::BackendError;
use super::transport::TransportError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend client could not be built.
    #[error("Backend client error: {0}")]
    Backend(#[from] BackendError),

    /// The transport failed to bind or stopped with an error.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
