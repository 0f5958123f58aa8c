//! Configuration management for the MCP server.
//!
//! A single [`Config`] value is built once at startup (from the environment,
//! or from defaults in tests) and handed explicitly to the backend client,
//! the server and the transport.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default base URL of the Whistle REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://dowhistle.herokuapp.com/v3";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Backend REST API configuration.
    pub backend: BackendConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration of the backend REST API the tools forward to.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every endpoint is resolved against.
    pub base_url: String,

    /// Optional base URL used only for proximity search.
    ///
    /// Development deployments point this at production so searches
    /// return real providers.
    pub search_base_url: Option<String>,

    /// Service API key, sent as a bearer token when a call carries no
    /// user access token of its own.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("search_base_url", &self.search_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BackendConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            search_base_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "console" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "whistle-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_API_BASE_URL`, `MCP_LOG_LEVEL`. A `.env` file in the
    /// working directory is loaded first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(format) = env_parse::<LogFormat>("MCP_LOG_FORMAT") {
            config.logging.format = format;
        }

        if let Ok(base_url) = std::env::var("MCP_API_BASE_URL") {
            config.backend.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(search_url) = std::env::var("MCP_SEARCH_BASE_URL") {
            let search_url = search_url.trim_end_matches('/').to_string();
            config.backend.search_base_url = (!search_url.is_empty()).then_some(search_url);
        }

        if let Ok(api_key) = std::env::var("MCP_API_KEY") {
            config.backend.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        }

        if let Some(timeout) = env_parse::<u64>("MCP_API_TIMEOUT_SECS") {
            config.backend.timeout_secs = timeout.max(1);
        }

        config.transport = TransportConfig::from_env();

        config
    }
}

/// Read and parse an environment variable, ignoring unset or malformed values.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_backend_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_API_BASE_URL", "http://localhost:4000/v3/");
            std::env::set_var("MCP_API_KEY", "test_key_12345");
            std::env::set_var("MCP_API_TIMEOUT_SECS", "5");
        }
        let config = Config::from_env();
        assert_eq!(config.backend.base_url, "http://localhost:4000/v3");
        assert_eq!(config.backend.api_key.as_deref(), Some("test_key_12345"));
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
        unsafe {
            std::env::remove_var("MCP_API_BASE_URL");
            std::env::remove_var("MCP_API_KEY");
            std::env::remove_var("MCP_API_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_backend_default_fallback() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("MCP_API_BASE_URL");
            std::env::remove_var("MCP_API_KEY");
            std::env::remove_var("MCP_SEARCH_BASE_URL");
        }
        let config = Config::from_env();
        assert_eq!(config.backend.base_url, DEFAULT_API_BASE_URL);
        assert!(config.backend.api_key.is_none());
        assert!(config.backend.search_base_url.is_none());
    }

    #[test]
    fn test_malformed_timeout_is_ignored() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_API_TIMEOUT_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.backend.timeout_secs, 30);
        unsafe {
            std::env::remove_var("MCP_API_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let backend = BackendConfig {
            api_key: Some("super_secret_key".to_string()),
            ..Default::default()
        };
        let debug_str = format!("{:?}", backend);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
