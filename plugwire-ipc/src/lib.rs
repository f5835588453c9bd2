//! Inter-process communication for plugwire plugins
//!
//! This crate provides the wire protocol spoken between a plugin and its host:
//! the message model, the length-prefixed JSON frame codec, and the stream
//! transports (Unix domain socket, Windows named pipe) the frames travel over.

pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use codec::{decode, encode, read_frame, read_message, write_frame, write_message};
pub use error::IpcError;
pub use protocol::{Message, MessageType, Params};
pub use transport::{listen_and_accept, Endpoint, IpcTransport, StreamTransport, NAMED_PIPE_PREFIX};
