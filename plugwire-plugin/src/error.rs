//! Plugin error types

use std::time::Duration;
use thiserror::Error;

use plugwire_config::ConfigError;
use plugwire_ipc::IpcError;

/// Plugin result type
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors raised while building or running a plugin
#[derive(Error, Debug)]
pub enum PluginError {
    /// A function with this name is already registered
    #[error("Function '{name}' is already registered")]
    DuplicateFunction { name: String },

    /// Function names must be non-empty
    #[error("Invalid function name '{name}': {reason}")]
    InvalidFunctionName { name: String, reason: String },

    /// No endpoint address in the environment or on the command line
    #[error("No endpoint address: set GOPROC_PLUGIN_ADDRESS or pass it as the first argument")]
    NoAddress,

    /// `start` called on a running plugin
    #[error("Plugin is already running")]
    AlreadyRunning,

    /// The host never acknowledged the REGISTER message
    #[error("Host did not acknowledge registration within {timeout:?}")]
    HandshakeTimeout { timeout: Duration },

    /// The connection dropped before the handshake completed
    #[error("Connection to host lost during start-up")]
    ConnectionLost,

    /// Transport or framing error
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PluginError {
    /// Create a new invalid function name error
    pub fn invalid_function_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFunctionName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
