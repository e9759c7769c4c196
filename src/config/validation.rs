//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every violation is
//! reported, not just the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::IntrospectConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("server.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("server.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("server.max_connections must be greater than zero")]
    ZeroConnections,

    #[error("backoff.initial_delay_ms must be greater than zero")]
    ZeroInitialDelay,

    #[error("backoff.initial_delay_ms ({initial}) exceeds backoff.max_delay_ms ({max})")]
    DelayOrder { initial: u64, max: u64 },

    #[error("backoff.multiplier must be at least 1.0, got {0}")]
    Multiplier(f64),

    #[error("backoff.jitter must be within [0.0, 1.0), got {0}")]
    Jitter(f64),
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &IntrospectConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let server = &config.server;
    if server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(server.bind_address.clone()));
    }
    if server.read_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_timeout_secs"));
    }
    if server.write_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("write_timeout_secs"));
    }
    if server.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }

    let backoff = &config.backoff;
    if backoff.initial_delay_ms == 0 {
        errors.push(ValidationError::ZeroInitialDelay);
    }
    if backoff.initial_delay_ms > backoff.max_delay_ms {
        errors.push(ValidationError::DelayOrder {
            initial: backoff.initial_delay_ms,
            max: backoff.max_delay_ms,
        });
    }
    if backoff.multiplier.is_nan() || backoff.multiplier < 1.0 {
        errors.push(ValidationError::Multiplier(backoff.multiplier));
    }
    if !(0.0..1.0).contains(&backoff.jitter) {
        errors.push(ValidationError::Jitter(backoff.jitter));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
