//! Configuration management for plugwire plugins
//!
//! This crate provides the plugin's runtime configuration (endpoint address,
//! handshake and accept deadlines, framing retry delay, logging), with YAML
//! file loading, `GOPROC_*` environment overrides and validation.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use domains::logging::{LogFormat, LogLevel, LoggingConfig};
pub use domains::plugin::{PluginConfig, ADDRESS_ENV_VAR};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export utilities
pub use domains::utils::serde_duration;
