//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (DISABLE_INTROSPECTION / INTROSPECTION_BIND_ADDRESS overrides)
//!     → validation.rs (semantic checks)
//!     → IntrospectConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{BackoffConfig, IntrospectConfig, LogFormat, ObservabilityConfig, ServerConfig};
pub use validation::ValidationError;
