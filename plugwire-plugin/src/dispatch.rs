//! Dispatch loop: reads frames, routes them, writes replies

use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use plugwire_ipc::{read_message, write_message, IpcError, IpcTransport, Message, MessageType};

use crate::registry::FunctionRegistry;
use crate::state::ProtocolState;

/// Why the dispatch loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The host sent STOP
    StopRequested,
    /// `running` was cleared locally
    LocalStop,
    /// The host closed the connection
    ConnectionClosed,
    /// A non-EOF transport failure
    TransportFailed,
}

impl LoopExit {
    fn from_error(err: &IpcError) -> Self {
        match err {
            IpcError::ConnectionClosed => LoopExit::ConnectionClosed,
            _ => LoopExit::TransportFailed,
        }
    }
}

/// Serves one host connection until STOP, EOF, transport failure or a local stop.
///
/// Calls are handled one at a time: each handler runs on the blocking pool
/// and its reply is written before the next frame is read, so replies leave
/// in request order.
pub struct DispatchLoop {
    transport: Box<dyn IpcTransport>,
    registry: Arc<FunctionRegistry>,
    state: Arc<ProtocolState>,
    retry_delay: Duration,
}

impl DispatchLoop {
    pub fn new(
        transport: Box<dyn IpcTransport>,
        registry: Arc<FunctionRegistry>,
        state: Arc<ProtocolState>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transport,
            registry,
            state,
            retry_delay,
        }
    }

    /// Run on its own task
    pub fn spawn(self) -> JoinHandle<LoopExit> {
        tokio::spawn(self.run())
    }

    /// Serve until the session ends, then clear `running` and close the connection
    pub async fn run(mut self) -> LoopExit {
        let exit = self.serve().await;

        self.state.mark_stopped();
        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "Closing connection failed");
        }

        info!(reason = ?exit, "Dispatch loop exited");
        exit
    }

    async fn serve(&mut self) -> LoopExit {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.state.wait_until_stopped() => return LoopExit::LocalStop,
                message = read_message(&mut *self.transport) => message,
            };

            match next {
                Ok(message) => {
                    if let Some(exit) = self.route(message).await {
                        return exit;
                    }
                }
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Dropping undecodable frame");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(IpcError::ConnectionClosed) => {
                    info!("Host closed the connection");
                    return LoopExit::ConnectionClosed;
                }
                Err(e) => {
                    warn!(error = %e, "Connection failed");
                    return LoopExit::TransportFailed;
                }
            }
        }
    }

    async fn route(&mut self, message: Message) -> Option<LoopExit> {
        match message.message_type {
            MessageType::Call => match handle_call(&self.registry, &self.state, message).await {
                CallOutcome::Reply(reply) => self.reply(reply).await,
                CallOutcome::Dropped => None,
                CallOutcome::Interrupted => Some(LoopExit::LocalStop),
            },
            MessageType::Ping => self.reply(Message::pong()).await,
            MessageType::RegisterAck => {
                self.state.mark_registered();
                None
            }
            MessageType::Stop => {
                info!("Host requested stop");
                self.state.mark_stopped();
                Some(LoopExit::StopRequested)
            }
            _ => {
                debug!(message_type = %message.message_type, "Ignoring message");
                None
            }
        }
    }

    async fn reply(&mut self, message: Message) -> Option<LoopExit> {
        match write_message(&mut *self.transport, &message).await {
            Ok(()) => None,
            Err(e) if e.is_connection_lost() => {
                warn!(error = %e, "Failed to send {} reply", message.message_type);
                Some(LoopExit::from_error(&e))
            }
            Err(e) => {
                warn!(error = %e, "Dropping unsendable {} reply", message.message_type);
                None
            }
        }
    }
}

enum CallOutcome {
    Reply(Message),
    /// Malformed CALL; nothing to answer against
    Dropped,
    /// `running` was cleared while the handler ran
    Interrupted,
}

/// Run the named function on the blocking pool.
///
/// A local stop wins over a handler still in flight: the handler is left to
/// finish on its own and its reply is discarded.
async fn handle_call(
    registry: &FunctionRegistry,
    state: &ProtocolState,
    message: Message,
) -> CallOutcome {
    let Some((id, function)) = message
        .call_target()
        .map(|(id, function)| (id.to_string(), function.to_string()))
    else {
        debug!("Dropping call without id or function");
        return CallOutcome::Dropped;
    };

    let Some(handler) = registry.get(&function) else {
        warn!(%id, %function, "Call to unknown function");
        return CallOutcome::Reply(Message::error(
            id,
            format!("function {} does not exist", function),
        ));
    };

    debug!(%id, %function, "Dispatching call");
    let params = message.params.unwrap_or_default();
    let task = tokio::task::spawn_blocking(move || handler.call(&params));

    let outcome = tokio::select! {
        biased;
        _ = state.wait_until_stopped() => {
            info!(%id, %function, "Stopped while function was running; reply discarded");
            return CallOutcome::Interrupted;
        }
        outcome = task => outcome,
    };

    CallOutcome::Reply(match outcome {
        Ok(Ok(value)) => Message::result(id, value),
        Ok(Err(e)) => {
            warn!(%id, %function, error = %e, "Function failed");
            Message::error(id, e.to_string())
        }
        Err(e) => {
            let detail = panic_detail(e);
            warn!(%id, %function, panic = %detail, "Function panicked");
            Message::error(id, format!("function {} panicked: {}", function, detail))
        }
    })
}

fn panic_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
