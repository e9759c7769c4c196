//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! carry defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Port the introspection endpoint listens on unless configured otherwise.
pub const INTROSPECTION_PORT: u16 = 61678;

/// Root configuration for the introspection service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IntrospectConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Restart backoff for the listener.
    pub backoff: BackoffConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Serve the introspection endpoint at all.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:61678").
    pub bind_address: String,

    /// Deadline for reading request headers, in seconds.
    pub read_timeout_secs: u64,

    /// Deadline for producing a response, in seconds.
    pub write_timeout_secs: u64,

    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: format!("0.0.0.0:{}", INTROSPECTION_PORT),
            read_timeout_secs: 5,
            write_timeout_secs: 5,
            max_connections: 64,
        }
    }
}

/// Exponential backoff applied between listener restarts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// First delay after a failure, in milliseconds.
    pub initial_delay_ms: u64,

    /// Upper bound for the un-jittered delay, in milliseconds.
    pub max_delay_ms: u64,

    /// Growth factor applied after every failure.
    pub multiplier: f64,

    /// Fraction of the delay used as +/- random jitter (0.2 = 20%).
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
