//! Registration handshake

use std::time::Duration;
use tracing::{error, info};

use plugwire_ipc::{write_message, IpcError, IpcTransport, Message};

use crate::registry::FunctionRegistry;
use crate::state::ProtocolState;

/// How the wait for REGISTER_ACK ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The host acknowledged and the loop is still serving
    Acknowledged,
    /// No acknowledgement before the deadline
    TimedOut,
    /// The dispatch loop stopped before an acknowledgement arrived
    ConnectionLost,
}

/// Announce every registered function, in registration order
pub async fn send_registration<T>(
    transport: &mut T,
    registry: &FunctionRegistry,
) -> Result<(), IpcError>
where
    T: IpcTransport + ?Sized,
{
    let message = Message::register(registry.names().iter().cloned());
    write_message(transport, &message).await?;

    info!(functions = ?registry.names(), "Registration sent");
    Ok(())
}

/// Wait for the dispatch loop to observe REGISTER_ACK.
///
/// Only the loop reads from the connection; this side just watches the
/// shared flags.
pub async fn await_acknowledgement(state: &ProtocolState, timeout: Duration) -> HandshakeOutcome {
    if tokio::time::timeout(timeout, state.wait_for_registration())
        .await
        .is_err()
    {
        error!(timeout = ?timeout, "Host did not acknowledge registration");
        return HandshakeOutcome::TimedOut;
    }

    let flags = state.snapshot();
    if flags.registered && flags.running {
        info!("Registration acknowledged");
        HandshakeOutcome::Acknowledged
    } else {
        HandshakeOutcome::ConnectionLost
    }
}
