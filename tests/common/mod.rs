//! Scripted host used by the integration tests
//!
//! Plays the controlling process's side of the wire protocol over a real
//! Unix domain socket, one message at a time.

#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use tokio::net::UnixStream;

use plugwire_ipc::{read_message, write_message, Message, MessageType, Params, StreamTransport};

/// Quiet logging for test output; later calls are no-ops
pub fn init_test_logging() {
    let _ = plugwire_logging::init_simple_tracing("warn");
}

/// Host side of one plugin connection
pub struct ScriptedHost {
    transport: StreamTransport<UnixStream>,
}

impl ScriptedHost {
    /// Connect to a plugin listening at `path`, retrying until it is up
    pub async fn connect(path: &Path) -> Result<Self> {
        for _ in 0..200 {
            if let Ok(stream) = UnixStream::connect(path).await {
                return Ok(Self {
                    transport: StreamTransport::new(stream),
                });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        bail!("plugin never listened on {}", path.display())
    }

    pub async fn send(&mut self, message: &Message) -> Result<()> {
        write_message(&mut self.transport, message).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<Message> {
        let message = tokio::time::timeout(Duration::from_secs(5), read_message(&mut self.transport))
            .await
            .context("timed out waiting for the plugin")??;
        Ok(message)
    }

    /// Read REGISTER, acknowledge it, return the announced names
    pub async fn accept_registration(&mut self) -> Result<Vec<String>> {
        let register = self.recv().await?;
        if register.message_type != MessageType::Register {
            bail!("expected register, got {}", register.message_type);
        }
        let names = register
            .registered_functions()
            .context("register without a function list")?;
        self.send(&Message::register_ack()).await?;
        Ok(names)
    }

    /// Send a CALL and wait for its reply
    pub async fn call(&mut self, id: &str, function: &str, params: JsonValue) -> Result<Message> {
        let params: Params = match params {
            JsonValue::Object(map) => map,
            other => bail!("params must be an object, got {}", other),
        };
        self.send(&Message::call(id, function, params)).await?;
        self.recv().await
    }

    /// Whether the plugin has hung up
    pub async fn is_closed(&mut self) -> bool {
        matches!(
            tokio::time::timeout(Duration::from_secs(5), read_message(&mut self.transport)).await,
            Ok(Err(plugwire_ipc::IpcError::ConnectionClosed))
        )
    }

    pub async fn disconnect(mut self) {
        let _ = plugwire_ipc::IpcTransport::close(&mut self.transport).await;
    }
}
