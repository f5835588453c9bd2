//! Function registry: the named handlers a plugin exposes to its host

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use plugwire_ipc::Params;

use crate::error::{PluginError, PluginResult};

/// Outcome of one handler invocation
pub type HandlerResult = Result<JsonValue, HandlerError>;

/// Application-level failure reported by a handler.
///
/// Always answered with an ERROR frame carrying the display text; never
/// stops the plugin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// A required parameter is absent
    #[error("missing parameter '{name}'")]
    MissingParam { name: String },

    /// A parameter is present but has the wrong shape
    #[error("parameter '{name}' must be {expected}")]
    InvalidParam { name: String, expected: String },

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParam { name: name.into() }
    }

    pub fn invalid(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.into(),
            expected: expected.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A callable exposed to the host under a name.
///
/// Handlers run on the blocking thread pool, one call at a time.
pub trait FunctionHandler: Send + Sync {
    fn call(&self, params: &Params) -> HandlerResult;
}

impl<F> FunctionHandler for F
where
    F: Fn(&Params) -> HandlerResult + Send + Sync,
{
    fn call(&self, params: &Params) -> HandlerResult {
        self(params)
    }
}

/// Name-to-handler mapping, in registration order.
///
/// Built before start-up, then handed to the plugin, which only reads it.
#[derive(Default)]
pub struct FunctionRegistry {
    order: Vec<String>,
    handlers: HashMap<String, Arc<dyn FunctionHandler>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure or function under `name`
    pub fn add<F>(&mut self, name: impl Into<String>, handler: F) -> PluginResult<()>
    where
        F: Fn(&Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_handler(name, handler)
    }

    /// Register any [`FunctionHandler`] under `name`
    pub fn add_handler<H>(&mut self, name: impl Into<String>, handler: H) -> PluginResult<()>
    where
        H: FunctionHandler + 'static,
    {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(PluginError::invalid_function_name(name, "name cannot be empty"));
        }
        if self.handlers.contains_key(&name) {
            return Err(PluginError::DuplicateFunction { name });
        }

        tracing::debug!(target: "function_registry", function = %name, "Function registered");

        self.handlers.insert(name.clone(), Arc::new(handler));
        self.order.push(name);
        Ok(())
    }

    /// Registered names, in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Look up a handler by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn FunctionHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.order)
            .finish()
    }
}
