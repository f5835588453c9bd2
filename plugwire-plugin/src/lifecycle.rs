//! Plugin lifecycle: start, wait, stop

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use plugwire_config::PluginConfig;
use plugwire_ipc::{listen_and_accept, Endpoint, IpcTransport};

use crate::dispatch::{DispatchLoop, LoopExit};
use crate::error::{PluginError, PluginResult};
use crate::handshake::{await_acknowledgement, send_registration, HandshakeOutcome};
use crate::registry::FunctionRegistry;
use crate::state::ProtocolState;

/// A plugin process's connection to its host.
///
/// Owns the function registry (read-only once constructed), the protocol
/// flags, and the dispatch loop task while a session is active.
pub struct Plugin {
    registry: Arc<FunctionRegistry>,
    config: PluginConfig,
    state: Arc<ProtocolState>,
    dispatch: Mutex<Option<JoinHandle<LoopExit>>>,
}

impl Plugin {
    pub fn new(registry: FunctionRegistry, config: PluginConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            state: Arc::new(ProtocolState::new()),
            dispatch: Mutex::new(None),
        }
    }

    /// Validate the configuration, listen on the configured address, accept
    /// the host, and complete the handshake
    pub async fn start(&self) -> PluginResult<()> {
        if self.is_running() {
            return Err(PluginError::AlreadyRunning);
        }
        self.config.validate_all()?;

        let endpoint = Endpoint::parse(self.config.address().ok_or(PluginError::NoAddress)?);
        info!(%endpoint, "Waiting for host connection");

        let transport = listen_and_accept(&endpoint, self.config.accept_timeout).await?;
        self.start_with_transport(transport).await
    }

    /// Run the handshake and the dispatch loop over an already connected transport.
    ///
    /// Succeeds only once the host has acknowledged registration and the
    /// loop is still serving. On failure the loop is stopped and the
    /// transport closed.
    pub async fn start_with_transport(
        &self,
        mut transport: Box<dyn IpcTransport>,
    ) -> PluginResult<()> {
        let mut dispatch = self.dispatch.lock().await;
        if self.is_running() {
            return Err(PluginError::AlreadyRunning);
        }
        // Reap a loop that ended on its own (STOP or EOF)
        if let Some(previous) = dispatch.take() {
            let _ = previous.await;
        }

        if let Err(e) = send_registration(&mut *transport, &self.registry).await {
            let _ = transport.close().await;
            return Err(e.into());
        }

        self.state.mark_running();
        let handle = DispatchLoop::new(
            transport,
            self.registry.clone(),
            self.state.clone(),
            self.config.retry_delay,
        )
        .spawn();

        match await_acknowledgement(&self.state, self.config.handshake_timeout).await {
            HandshakeOutcome::Acknowledged => {
                *dispatch = Some(handle);
                info!(functions = self.registry.len(), "Plugin started");
                Ok(())
            }
            outcome => {
                self.state.mark_stopped();
                if let Err(e) = handle.await {
                    warn!(error = %e, "Dispatch task ended abnormally");
                }
                match outcome {
                    HandshakeOutcome::TimedOut => Err(PluginError::HandshakeTimeout {
                        timeout: self.config.handshake_timeout,
                    }),
                    _ => Err(PluginError::ConnectionLost),
                }
            }
        }
    }

    /// Block until the session ends (STOP, connection loss or [`Plugin::stop`]).
    ///
    /// Returns immediately when not running.
    pub async fn wait(&self) {
        self.state.wait_until_stopped().await;
    }

    /// End the session and wait for the dispatch loop to close the connection.
    ///
    /// A handler still running is not waited for; its reply is discarded.
    /// Calling this twice is harmless.
    pub async fn stop(&self) {
        self.state.mark_stopped();

        let handle = self.dispatch.lock().await.take();
        if let Some(handle) = handle {
            match handle.await {
                Ok(exit) => info!(reason = ?exit, "Plugin stopped"),
                Err(e) => warn!(error = %e, "Dispatch task ended abnormally"),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    /// Registered function names, in registration order
    pub fn function_names(&self) -> &[String] {
        self.registry.names()
    }
}
