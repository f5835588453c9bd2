//! IPC error types

use thiserror::Error;

/// IPC error types
#[derive(Debug, Error)]
pub enum IpcError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Frame body could not be decoded into a message
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Connection closed by the peer
    #[error("Connection closed")]
    ConnectionClosed,

    /// Frame body does not fit the 4-byte length prefix
    #[error("Frame too large: {0} bytes exceeds the 4-byte length prefix")]
    FrameTooLarge(usize),

    /// Timed out waiting for the host to connect
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Endpoint kind not available on this platform
    #[error("Unsupported endpoint on this platform: {0}")]
    UnsupportedEndpoint(String),

    /// Transport not connected
    #[error("Transport not connected")]
    NotConnected,
}

impl IpcError {
    /// Check if this error means the connection is gone for good
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            IpcError::ConnectionClosed | IpcError::IoError(_) | IpcError::NotConnected
        )
    }

    /// Check if the stream is still usable after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, IpcError::DecodeError(_))
    }
}

impl From<std::io::Error> for IpcError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => IpcError::ConnectionClosed,
            _ => IpcError::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for IpcError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            IpcError::IoError(err.to_string())
        } else if err.is_data() || err.is_syntax() || err.is_eof() {
            IpcError::DecodeError(err.to_string())
        } else {
            IpcError::SerializationError(err.to_string())
        }
    }
}
