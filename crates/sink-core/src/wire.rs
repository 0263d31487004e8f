//! Sink wire format, the framed message every chunk travels in.
//!
//! Frames are OpenNMS `SinkMessage` protobuf records:
//!
//!   message SinkMessage {
//!     string message_id           = 1;
//!     int32  current_chunk_number = 2;
//!     int32  total_chunks         = 3;
//!     bytes  content              = 4;
//!   }
//!
//! Field tags are the protocol. A consumer built against the same schema can
//! decode each frame on its own, without knowing the payload's total length,
//! and skips fields it does not know. Changing a tag is a breaking change.

use bytes::{Bytes, BytesMut};
use prost::Message;

// ── Schema ────────────────────────────────────────────────────────────────────

/// Protobuf record carried as the value of every transport message.
#[derive(Clone, PartialEq, Message)]
pub struct SinkMessage {
    /// Shared by every chunk of one payload. Also the transport routing key.
    #[prost(string, tag = "1")]
    pub message_id: String,

    /// Zero-based position of this chunk.
    #[prost(int32, tag = "2")]
    pub current_chunk_number: i32,

    /// Number of chunks the payload was split into.
    #[prost(int32, tag = "3")]
    pub total_chunks: i32,

    /// This chunk's slice of the payload.
    #[prost(bytes = "bytes", tag = "4")]
    pub content: Bytes,
}

/// Largest chunk count the int32 fields can carry.
pub const MAX_CHUNKS: usize = i32::MAX as usize;

// ── Frames ────────────────────────────────────────────────────────────────────

/// One outgoing chunk of a payload, before encoding.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub message_id: &'a str,
    pub index: usize,
    pub count: usize,
    pub content: Bytes,
}

/// One chunk read back off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub message_id: String,
    pub index: usize,
    pub count: usize,
    pub content: Bytes,
}

impl DecodedFrame {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

impl Frame<'_> {
    /// Check the frame against the schema's constraints and build the record.
    pub fn to_message(&self) -> Result<SinkMessage, WireError> {
        if self.message_id.is_empty() {
            return Err(WireError::EmptyMessageId);
        }
        if self.count == 0 {
            return Err(WireError::ZeroChunks);
        }
        if self.count > MAX_CHUNKS {
            return Err(WireError::TooManyChunks(self.count));
        }
        if self.index >= self.count {
            return Err(WireError::IndexOutOfRange {
                index: self.index,
                count: self.count,
            });
        }

        Ok(SinkMessage {
            message_id: self.message_id.to_owned(),
            current_chunk_number: self.index as i32,
            total_chunks: self.count as i32,
            content: self.content.clone(),
        })
    }
}

/// Encode a frame into its wire bytes.
///
/// Fails rather than returning an empty buffer: an empty result would be
/// indistinguishable from a legitimate empty-content chunk downstream.
pub fn encode(frame: &Frame<'_>) -> Result<Bytes, WireError> {
    let message = frame.to_message()?;
    let mut buf = BytesMut::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(buf.freeze())
}

/// Decode a single frame, applying the same constraints the encoder enforces.
pub fn decode(data: &[u8]) -> Result<DecodedFrame, WireError> {
    let message = SinkMessage::decode(data)?;

    if message.message_id.is_empty() {
        return Err(WireError::EmptyMessageId);
    }
    let count = usize::try_from(message.total_chunks).map_err(|_| WireError::NegativeField {
        field: "total_chunks",
        value: message.total_chunks,
    })?;
    let index =
        usize::try_from(message.current_chunk_number).map_err(|_| WireError::NegativeField {
            field: "current_chunk_number",
            value: message.current_chunk_number,
        })?;
    if count == 0 {
        return Err(WireError::ZeroChunks);
    }
    if index >= count {
        return Err(WireError::IndexOutOfRange { index, count });
    }

    Ok(DecodedFrame {
        message_id: message.message_id,
        index,
        count,
        content: message.content,
    })
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// A frame could not be written to, or read from, the wire schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("message id must not be empty")]
    EmptyMessageId,

    #[error("total chunk count must be at least 1")]
    ZeroChunks,

    #[error("chunk count {0} exceeds maximum {max}", max = MAX_CHUNKS)]
    TooManyChunks(usize),

    #[error("chunk index {index} out of range for {count} chunks")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("{field} is negative: {value}")]
    NegativeField { field: &'static str, value: i32 },

    #[error("protobuf encode failed: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("protobuf decode failed: {0}")]
    Decode(#[from] prost::DecodeError),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
