//! Length-prefixed framing for JSON-RPC messages.
//!
//! Each frame is a 4-byte big-endian payload length followed by the UTF-8
//! JSON payload:
//!
//! ```text
//! +----------------+------------------+
//! |  4 bytes       |  N bytes         |
//! |  (length BE)   |  (JSON payload)  |
//! +----------------+------------------+
//! ```

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::protocol::Message;

/// Largest payload accepted in either direction (8 MB)
pub const MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

const HEADER_LEN: usize = 4;

/// Codec for length-prefixed JSON-RPC messages.
///
/// Frames that are not valid JSON-RPC are logged and skipped; only oversized
/// frames and I/O failures end the stream.
#[derive(Debug, Default)]
pub struct JsonRpcCodec {
    pending_len: Option<usize>,
}

impl JsonRpcCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for JsonRpcCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let len = match self.pending_len {
                Some(len) => len,
                None => {
                    if src.len() < HEADER_LEN {
                        return Ok(None);
                    }
                    let len = src.get_u32() as usize;
                    if len > MAX_FRAME_SIZE {
                        return Err(CodecError::FrameTooLarge(len));
                    }
                    self.pending_len = Some(len);
                    len
                }
            };

            if src.len() < len {
                src.reserve(len - src.len());
                return Ok(None);
            }

            let payload = src.split_to(len);
            self.pending_len = None;

            // The bad frame is fully consumed, so the stream stays aligned
            match serde_json::from_slice(&payload) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => warn!("Skipping malformed {len}-byte frame: {e}"),
            }
        }
    }
}

impl Encoder<Message> for JsonRpcCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(&item)?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len as usize <= MAX_FRAME_SIZE)
            .ok_or(CodecError::FrameTooLarge(payload.len()))?;

        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u32(len);
        dst.put_slice(&payload);
        Ok(())
    }
}

/// Errors that can occur while framing messages
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),
}
