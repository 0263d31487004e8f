//! Dry-run transport. Decodes and logs each chunk instead of sending it.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use sink_core::transport::{Ack, Transport, TransportError};
use sink_core::wire;

/// Acknowledges every chunk on partition 0 with increasing offsets.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    next_offset: AtomicI64,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks acknowledged so far.
    pub fn sent(&self) -> i64 {
        self.next_offset.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError> {
        // A chunk that doesn't decode here wouldn't decode at the consumer either.
        let frame = wire::decode(&payload).map_err(|e| TransportError::rejected(topic, e))?;
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            topic,
            key,
            chunk = frame.index + 1,
            total = frame.count,
            content_bytes = frame.content.len(),
            wire_bytes = payload.len(),
            "dry run, chunk not sent"
        );

        Ok(Ack {
            partition: 0,
            offset,
        })
    }
}
