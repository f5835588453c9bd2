//! IPC transport implementations

use async_trait::async_trait;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::IpcError;

/// Address prefix that selects the named-pipe transport
pub const NAMED_PIPE_PREFIX: &str = r"\\.\pipe\";

/// Byte-level transport trait shared by every connection mechanism
#[async_trait]
pub trait IpcTransport: Send + Sync {
    /// Write some of `buf`, returning how many bytes were accepted
    async fn send(&mut self, buf: &[u8]) -> Result<usize, IpcError>;

    /// Read up to `max_bytes`; an empty result means the peer closed the stream
    async fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>, IpcError>;

    /// Push buffered bytes out. Best effort: failures are logged, not returned.
    async fn flush(&mut self) -> Result<(), IpcError> {
        Ok(())
    }

    /// Close the transport
    async fn close(&mut self) -> Result<(), IpcError>;
}

/// Transport over any async byte stream (socket, pipe, in-memory duplex)
pub struct StreamTransport<S> {
    stream: Option<S>,
    flush_after_write: bool,
}

impl<S> StreamTransport<S> {
    /// Create a new stream transport
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            flush_after_write: false,
        }
    }

    /// Flush the stream after every complete frame write
    pub fn with_flush_after_write(mut self, enabled: bool) -> Self {
        self.flush_after_write = enabled;
        self
    }

    /// Whether the underlying stream is still open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl<S> IpcTransport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    async fn send(&mut self, buf: &[u8]) -> Result<usize, IpcError> {
        let stream = self.stream.as_mut().ok_or(IpcError::NotConnected)?;
        let written = stream.write(buf).await?;
        if written == 0 && !buf.is_empty() {
            return Err(IpcError::IoError("stream accepted zero bytes".to_string()));
        }
        Ok(written)
    }

    async fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>, IpcError> {
        let stream = self.stream.as_mut().ok_or(IpcError::NotConnected)?;
        let mut buf = vec![0u8; max_bytes];
        let read = stream.read(&mut buf).await?;
        buf.truncate(read);
        Ok(buf)
    }

    async fn flush(&mut self) -> Result<(), IpcError> {
        if !self.flush_after_write {
            return Ok(());
        }
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.flush().await {
                warn!("Flush after write failed: {}", e);
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), IpcError> {
        // Take ownership and drop to close
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Stream shutdown on close failed: {}", e);
            }
        }
        Ok(())
    }
}

/// Listening endpoint, selected by address syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Filesystem path of a Unix domain socket
    UnixSocket(PathBuf),
    /// Windows named pipe (`\\.\pipe\...`)
    NamedPipe(String),
}

impl Endpoint {
    /// Classify an address string
    pub fn parse(address: &str) -> Self {
        if address.starts_with(NAMED_PIPE_PREFIX) {
            Endpoint::NamedPipe(address.to_string())
        } else {
            Endpoint::UnixSocket(PathBuf::from(address))
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::UnixSocket(path) => write!(f, "unix:{}", path.display()),
            Endpoint::NamedPipe(name) => write!(f, "pipe:{}", name),
        }
    }
}

/// Listen on `endpoint`, accept exactly one host connection, stop listening.
///
/// `accept_timeout` bounds the wait for the host; `None` waits forever.
pub async fn listen_and_accept(
    endpoint: &Endpoint,
    accept_timeout: Option<Duration>,
) -> Result<Box<dyn IpcTransport>, IpcError> {
    let accept = async {
        match endpoint {
            Endpoint::UnixSocket(path) => accept_unix(path).await,
            Endpoint::NamedPipe(name) => accept_pipe(name).await,
        }
    };

    match accept_timeout {
        Some(limit) => tokio::time::timeout(limit, accept)
            .await
            .map_err(|_| IpcError::Timeout(limit.as_millis() as u64))?,
        None => accept.await,
    }
}

#[cfg(unix)]
async fn accept_unix(path: &Path) -> Result<Box<dyn IpcTransport>, IpcError> {
    use tokio::net::UnixListener;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed stale socket file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove stale socket {}: {}", path.display(), e),
    }

    let listener = UnixListener::bind(path)?;
    info!("Listening on {}", path.display());

    let (stream, _) = listener.accept().await?;
    // Single-client endpoint: stop listening once the host is in
    drop(listener);
    info!("Host connected on {}", path.display());

    Ok(Box::new(StreamTransport::new(stream)))
}

#[cfg(not(unix))]
async fn accept_unix(path: &Path) -> Result<Box<dyn IpcTransport>, IpcError> {
    Err(IpcError::UnsupportedEndpoint(format!(
        "unix socket {}",
        path.display()
    )))
}

#[cfg(windows)]
async fn accept_pipe(name: &str) -> Result<Box<dyn IpcTransport>, IpcError> {
    use tokio::net::windows::named_pipe::ServerOptions;

    let server = ServerOptions::new()
        .first_pipe_instance(true)
        .max_instances(1)
        .create(name)?;
    info!("Listening on {}", name);

    server.connect().await?;
    info!("Host connected on {}", name);

    Ok(Box::new(
        StreamTransport::new(server).with_flush_after_write(true),
    ))
}

#[cfg(not(windows))]
async fn accept_pipe(name: &str) -> Result<Box<dyn IpcTransport>, IpcError> {
    Err(IpcError::UnsupportedEndpoint(format!("named pipe {}", name)))
}
