//! Transport trait, the delivery boundary the publisher drives.
//!
//! A transport sends one framed message, keyed by message id, to a named
//! topic and resolves once the broker has acknowledged it. The publisher
//! only relies on messages with the same key to the same topic landing in a
//! single ordered partition; it needs nothing else from the binding.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// Where the broker stored an acknowledged message.
///
/// Transports without partitions report partition 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack {
    pub partition: i32,
    pub offset: i64,
}

/// Anything that can deliver one framed message and wait for its acknowledgment.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `payload` to `topic` with routing key `key`.
    ///
    /// Resolves only after the message is acknowledged or has failed. Any
    /// deadline is this method's responsibility and surfaces as
    /// [`TransportError::Timeout`].
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError> {
        (**self).send(topic, key, payload).await
    }
}

#[async_trait]
impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError> {
        (**self).send(topic, key, payload).await
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// The transport failed to deliver or acknowledge a message.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("delivery to {topic} timed out after {timeout:?}")]
    Timeout { topic: String, timeout: Duration },

    #[error("delivery to {topic} failed: {reason}")]
    Rejected { topic: String, reason: String },
}

impl TransportError {
    pub fn rejected(topic: &str, reason: impl ToString) -> Self {
        Self::Rejected {
            topic: topic.to_owned(),
            reason: reason.to_string(),
        }
    }
}
