//! Framing and message types of the render protocol.
//!
//! Frame layout (big-endian):
//! ``MAGIC(4) || LENGTH(4) || PAYLOAD``
//!
//! The payload is one JSON document: a [`ClientMessage`] from client to server, an [`Ack`] from
//! server to client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::foundation::error::{VisionError, VisionResult};
use crate::ir::command::Record;

/// Frame magic.
pub const MAGIC: [u8; 4] = *b"VSN1";
/// Bytes before the payload.
pub const HEADER_LEN: usize = 8;
/// Payload ceiling used when nothing else is configured.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 256 * 1024 * 1024;

/// Client to server message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Unary procedure call; answered by one [`Ack`].
    Call(Record),
    /// Open a client stream for `procedure`.
    Open {
        /// Streaming procedure name.
        procedure: String,
    },
    /// One streamed item; never answered.
    Item(serde_json::Value),
    /// Close the open stream; answered by one [`Ack`].
    Close,
}

/// Server acknowledgment. Carries no error detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Whether the call (or every item of the stream) succeeded.
    pub state: bool,
}

/// Encode `msg` as one frame.
pub fn encode_frame<T: Serialize>(msg: &T) -> VisionResult<Vec<u8>> {
    let payload = serde_json::to_vec(msg).map_err(anyhow::Error::from)?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        VisionError::protocol(format!("payload of {} bytes exceeds u32", payload.len()))
    })?;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a frame payload.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> VisionResult<T> {
    serde_json::from_slice(payload).map_err(|e| VisionError::decode(e.to_string()))
}

/// Write one frame.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> VisionResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame payload.
///
/// Returns `Ok(None)` when the peer closes before sending any header byte. A truncated header
/// is an `UnexpectedEof` I/O error; a bad magic or an oversized length is a protocol error.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> VisionResult<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut read = 0usize;
    while read < header.len() {
        let n = reader.read(&mut header[read..]).await?;
        if n == 0 {
            if read == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("truncated frame header: read {read} of {HEADER_LEN} bytes"),
            )
            .into());
        }
        read += n;
    }
    if header[0..4] != MAGIC {
        return Err(VisionError::protocol(format!(
            "bad frame magic {:02x?}",
            &header[0..4]
        )));
    }
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if len > max_payload {
        return Err(VisionError::protocol(format!(
            "payload of {len} bytes exceeds limit of {max_payload}"
        )));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

#[cfg(test)]
#[path = "../../tests/unit/service/wire.rs"]
mod tests;
