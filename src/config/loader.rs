//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::IntrospectConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Set to "true" to keep the introspection endpoint from starting.
pub const ENV_DISABLE_INTROSPECTION: &str = "DISABLE_INTROSPECTION";

/// Overrides `server.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "INTROSPECTION_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<IntrospectConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: IntrospectConfig = toml::from_str(&content)?;
    finalize(config, |name| std::env::var(name).ok())
}

/// Defaults plus environment overrides, for running without a file.
pub fn load_from_env() -> Result<IntrospectConfig, ConfigError> {
    finalize(IntrospectConfig::default(), |name| std::env::var(name).ok())
}

fn finalize<F>(mut config: IntrospectConfig, lookup: F) -> Result<IntrospectConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply the environment variables the node agent has always honoured.
pub fn apply_env_overrides<F>(config: &mut IntrospectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_DISABLE_INTROSPECTION) {
        if value.trim().eq_ignore_ascii_case("true") {
            config.server.enabled = false;
        }
    }
    if let Some(address) = lookup(ENV_BIND_ADDRESS) {
        let address = address.trim();
        if !address.is_empty() {
            config.server.bind_address = address.to_string();
        }
    }
}
