//! Configuration loading and constants.
//!
//! Configuration comes from an optional TOML file layered over built-in defaults,
//! with the `PORT` environment variable taking precedence for the listening port.
//! `AppConfig` is the root configuration struct and is fixed once at startup.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

// =============================================================================
// HTTP Server Defaults
// =============================================================================

/// Environment variable holding the TCP port to listen on
pub const PORT_ENV_VAR: &str = "PORT";

/// Port used when neither `PORT` nor the config file set one
pub const DEFAULT_PORT: u16 = 3000;

/// Listen on all interfaces by default
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Cache-Control for every response; results are computed per request
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Largest request body a handler will read; larger bodies get 413
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// Logging Defaults
// =============================================================================

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "sum_service=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// How much of a request body the request logger writes out.
/// Only affects the log line; the handler always sees the full body.
pub const DEFAULT_MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    /// Resolve the configured host and port into a bindable address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid http.host or http.port '{}:{}': {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
    /// Log method, URI, headers and body of every request
    #[serde(default = "LoggingConfig::default_log_requests")]
    pub log_requests: bool,
    /// Number of body bytes included in the request log line
    #[serde(default = "LoggingConfig::default_max_logged_body_bytes")]
    pub max_logged_body_bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            log_requests: Self::default_log_requests(),
            max_logged_body_bytes: Self::default_max_logged_body_bytes(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    fn default_log_requests() -> bool {
        true
    }

    fn default_max_logged_body_bytes() -> usize {
        DEFAULT_MAX_LOGGED_BODY_BYTES
    }

    /// Whether structured JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the value of the `PORT` environment variable.
    ///
    /// An absent or empty value keeps the configured port. Anything that is not
    /// a valid TCP port is rejected so startup fails instead of guessing.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        self.http.port = raw.parse().map_err(|_| {
            ConfigError::Validation(format!("{} must be a TCP port number, got '{}'", PORT_ENV_VAR, raw))
        })?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
