//! Plugin-side protocol engine for plugwire
//!
//! A plugin registers named functions in a [`FunctionRegistry`], hands it to
//! a [`Plugin`], and calls [`Plugin::start`]. The plugin listens on the
//! endpoint its host gave it, accepts the host's single connection, announces
//! its functions, and serves CALL requests until the host sends STOP or the
//! connection goes away.
//!
//! ```rust,no_run
//! use plugwire_plugin::{FunctionRegistry, Plugin, PluginConfig};
//! use serde_json::json;
//!
//! # async fn run() -> plugwire_plugin::PluginResult<()> {
//! let mut registry = FunctionRegistry::new();
//! registry.add("ping", |_| Ok(json!("pong")))?;
//!
//! let plugin = Plugin::new(registry, PluginConfig::default());
//! plugin.start().await?;
//! plugin.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod handshake;
pub mod lifecycle;
pub mod params;
pub mod registry;
pub mod state;

// Re-export main types
pub use dispatch::{DispatchLoop, LoopExit};
pub use error::{PluginError, PluginResult};
pub use handshake::HandshakeOutcome;
pub use lifecycle::Plugin;
pub use registry::{FunctionHandler, FunctionRegistry, HandlerError, HandlerResult};
pub use state::{ProtocolFlags, ProtocolState};

pub use plugwire_config::PluginConfig;
pub use plugwire_ipc::Params;
