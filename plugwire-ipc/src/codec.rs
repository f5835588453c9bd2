//! Length-prefixed JSON frame codec
//!
//! Every frame on the wire is a 4-byte big-endian body length followed by
//! that many bytes of UTF-8 JSON. One call encodes or decodes exactly one
//! complete message.

use crate::error::IpcError;
use crate::protocol::Message;
use crate::transport::IpcTransport;

/// Size of the big-endian length prefix
pub const FRAME_HEADER_LEN: usize = 4;

/// Largest chunk requested from the transport in one receive
const READ_CHUNK: usize = 64 * 1024;

/// Serialize `message` into a complete frame (header + body)
pub fn encode(message: &Message) -> Result<Vec<u8>, IpcError> {
    let body = serde_json::to_vec(message)
        .map_err(|e| IpcError::SerializationError(e.to_string()))?;
    let len = u32::try_from(body.len()).map_err(|_| IpcError::FrameTooLarge(body.len()))?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a frame body (without its header) into a message
pub fn decode(body: &[u8]) -> Result<Message, IpcError> {
    let text = std::str::from_utf8(body).map_err(|e| IpcError::DecodeError(e.to_string()))?;
    serde_json::from_str(text).map_err(|e| IpcError::DecodeError(e.to_string()))
}

/// Read exactly `len` bytes, looping over partial receives.
///
/// The buffer grows with the data actually received, not with the header.
async fn read_exact<T>(transport: &mut T, len: usize) -> Result<Vec<u8>, IpcError>
where
    T: IpcTransport + ?Sized,
{
    let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
    while buf.len() < len {
        let chunk = transport.receive((len - buf.len()).min(READ_CHUNK)).await?;
        if chunk.is_empty() {
            return Err(IpcError::ConnectionClosed);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Read one frame and return its body
pub async fn read_frame<T>(transport: &mut T) -> Result<Vec<u8>, IpcError>
where
    T: IpcTransport + ?Sized,
{
    let header = read_exact(transport, FRAME_HEADER_LEN).await?;
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    read_exact(transport, len).await
}

/// Write a complete frame, looping over partial sends, then flush
pub async fn write_frame<T>(transport: &mut T, frame: &[u8]) -> Result<(), IpcError>
where
    T: IpcTransport + ?Sized,
{
    let mut offset = 0;
    while offset < frame.len() {
        offset += transport.send(&frame[offset..]).await?;
    }
    transport.flush().await
}

/// Read and decode one message.
///
/// A `DecodeError` leaves the stream aligned on the next frame, so callers
/// may keep reading.
pub async fn read_message<T>(transport: &mut T) -> Result<Message, IpcError>
where
    T: IpcTransport + ?Sized,
{
    let body = read_frame(transport).await?;
    decode(&body)
}

/// Encode and write one message
pub async fn write_message<T>(transport: &mut T, message: &Message) -> Result<(), IpcError>
where
    T: IpcTransport + ?Sized,
{
    let frame = encode(message)?;
    write_frame(transport, &frame).await
}
