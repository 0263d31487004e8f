//! Publishing: plan, frame, and deliver one payload in order.
//!
//! Chunks go out strictly one at a time: chunk `i + 1` is not handed to the
//! transport until chunk `i` has been acknowledged. Brokers only order
//! messages per key, and pipelined sends can be reordered by client-side
//! retries, so waiting on each acknowledgment is what keeps a consumer from
//! ever seeing chunk `i + 1` before chunk `i`.
//!
//! Any failure ends the call. Chunks already acknowledged stay delivered and
//! the rest are never attempted. A retry is a new publish with a new id.

use bytes::Bytes;

use crate::chunk;
use crate::config::ChunkConfig;
use crate::identity::{IdSource, MessageId, RandomIds};
use crate::transport::{Ack, Transport, TransportError};
use crate::wire::{self, Frame, WireError};

/// Outcome of a completed publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub message_id: MessageId,
    /// Chunks delivered. Zero for an empty payload with a bounded chunk size.
    pub frames: usize,
    /// Payload bytes delivered.
    pub bytes: usize,
    /// One acknowledgment per chunk, in index order.
    pub acks: Vec<Ack>,
}

/// Sends payloads as ordered chunk sequences over a transport.
pub struct Publisher<T, I = RandomIds> {
    transport: T,
    ids: I,
    config: ChunkConfig,
}

impl<T: Transport> Publisher<T> {
    pub fn new(transport: T, config: ChunkConfig) -> Self {
        Self {
            transport,
            ids: RandomIds,
            config,
        }
    }
}

impl<T: Transport, I: IdSource> Publisher<T, I> {
    /// Replace the identity source.
    pub fn with_ids<J: IdSource>(self, ids: J) -> Publisher<T, J> {
        Publisher {
            transport: self.transport,
            ids,
            config: self.config,
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Split `payload` into chunks and deliver them in index order.
    pub async fn publish(&self, payload: impl Into<Bytes>) -> Result<PublishReceipt, PublishError> {
        let payload: Bytes = payload.into();
        let message_id = self.ids.next_id();
        let topic = self.config.topic();
        let max = self.config.max_frame_size();
        let len = payload.len();
        let count = chunk::plan_count(len, max);

        tracing::debug!(
            key = %message_id,
            bytes = len,
            max_frame_size = max,
            chunks = count,
            "payload planned"
        );
        if count == 0 {
            tracing::debug!(key = %message_id, "empty payload, nothing to send");
        }

        let mut acks = Vec::with_capacity(count);
        for index in 0..count {
            let frame = Frame {
                message_id: message_id.as_str(),
                index,
                count,
                content: payload.slice(chunk::bounds(len, max, index)),
            };
            let encoded =
                wire::encode(&frame).map_err(|source| PublishError::Encoding { index, source })?;

            let sent = self
                .transport
                .send(topic, message_id.as_str(), encoded)
                .await;
            let ack = match sent {
                Ok(ack) => ack,
                Err(source) => {
                    tracing::warn!(
                        key = %message_id,
                        chunk = index + 1,
                        total = count,
                        delivered = index,
                        topic,
                        error = %source,
                        "chunk delivery failed, aborting publish"
                    );
                    return Err(PublishError::Transport {
                        message_id,
                        index,
                        count,
                        delivered: index,
                        source,
                    });
                }
            };

            tracing::info!(
                chunk = index + 1,
                total = count,
                key = %message_id,
                partition = ack.partition,
                offset = ack.offset,
                topic,
                "message chunk sent"
            );
            acks.push(ack);
        }

        Ok(PublishReceipt {
            message_id,
            frames: count,
            bytes: len,
            acks,
        })
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a publish stopped. Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Chunk `index` could not be encoded. Nothing from it was sent.
    #[error("failed to encode chunk {index}: {source}")]
    Encoding {
        index: usize,
        #[source]
        source: WireError,
    },

    /// Chunk `index` was not acknowledged. Chunks `0..delivered` were.
    #[error("chunk {index} of {count} for {message_id} was not delivered ({delivered} delivered): {source}")]
    Transport {
        message_id: MessageId,
        index: usize,
        count: usize,
        delivered: usize,
        #[source]
        source: TransportError,
    },
}

impl PublishError {
    /// Index of the chunk the publish stopped at.
    pub fn index(&self) -> usize {
        match self {
            Self::Encoding { index, .. } | Self::Transport { index, .. } => *index,
        }
    }
}
