//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: Standard input/output (default for MCP) - feature: `stdio`
//! - **HTTP**: HTTP server with JSON-RPC over POST requests - feature: `http`
//!
//! Liveness (`/healthz`) and readiness (`/readyz`) checks are served by the
//! HTTP transport, and by a side listener when running over STDIO.
//!
//! # Feature Flags
//!
//! - `stdio` (default): STDIO transport - minimal dependencies
//! - `http` (default): HTTP transport and health endpoints - adds axum, tower, tower-http

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "stdio")]
pub use config::StdioConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
