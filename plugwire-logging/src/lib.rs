//! Structured logging initialisation for plugwire plugins
//!
//! Installs a global `tracing` subscriber from a [`LoggingConfig`]. Output
//! always goes to stderr: stdout may belong to the host. Records emitted
//! through the `log` facade (the IPC layer logs that way) are bridged into
//! the same subscriber.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
pub use plugwire_config::{LogFormat, LogLevel, LoggingConfig};
