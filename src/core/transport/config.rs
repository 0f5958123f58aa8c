//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::config::env_parse;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio(StdioConfig),

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// STDIO transport configuration.
///
/// The protocol runs over stdin/stdout; the optional health listener serves
/// `/healthz` and `/readyz` for container health checks.
#[cfg(feature = "stdio")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioConfig {
    /// Host address the health listener binds to.
    #[serde(default = "default_host")]
    pub health_host: String,

    /// Port of the health listener. `None` disables it.
    #[serde(default = "default_health_port")]
    pub health_port: Option<u16>,
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
const DEFAULT_HTTP_PORT: u16 = 8000;
#[cfg(feature = "stdio")]
const DEFAULT_HEALTH_PORT: u16 = 8080;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "stdio")]
fn default_health_port() -> Option<u16> {
    Some(DEFAULT_HEALTH_PORT)
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            Self::Stdio(StdioConfig::default())
        }

        #[cfg(all(not(feature = "stdio"), feature = "http"))]
        {
            Self::Http(HttpConfig::default())
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "stdio")]
impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            health_host: default_host(),
            health_port: default_health_port(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio(StdioConfig::default())
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` selects `stdio` or `http`; anything else falls back
    /// to the default transport.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());

        match transport.as_str() {
            #[cfg(feature = "http")]
            "http" => {
                let port = env_parse("MCP_HTTP_PORT").unwrap_or(DEFAULT_HTTP_PORT);
                let rpc_path = std::env::var("MCP_HTTP_PATH")
                    .ok()
                    .filter(|p| p.starts_with('/'))
                    .unwrap_or_else(default_rpc_path);
                let enable_cors = std::env::var("MCP_HTTP_CORS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true);
                Self::Http(HttpConfig {
                    port,
                    host,
                    rpc_path,
                    enable_cors,
                })
            }
            #[cfg(feature = "stdio")]
            _ => {
                let health_port = match env_parse::<u16>("MCP_HEALTH_PORT") {
                    Some(0) => None,
                    Some(port) => Some(port),
                    None => default_health_port(),
                };
                Self::Stdio(StdioConfig {
                    health_host: host,
                    health_port,
                })
            }
            #[cfg(all(not(feature = "stdio"), feature = "http"))]
            _ => Self::Http(HttpConfig {
                host,
                ..HttpConfig::default()
            }),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio(cfg) => match cfg.health_port {
                Some(port) => format!(
                    "STDIO (standard MCP mode), health on {}:{}",
                    cfg.health_host, port
                ),
                None => "STDIO (standard MCP mode)".to_string(),
            },
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio(_))
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}
