//! Sink publisher integration tests.
//!
//! Everything here runs in-process against a recording transport, so no
//! broker is needed:
//!
//!   cargo test --test integration
//!
//! The recorder decodes nothing on the way in. Tests decode what it captured
//! the same way a Sink consumer would.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use sink_core::{
    wire, Ack, ChunkConfig, DecodedFrame, MessageId, Publisher, Transport, TransportError,
};

mod concurrency;
mod config;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const TOPIC: &str = "OpenNMS.Sink.Events";

/// One captured `send` call.
#[derive(Debug, Clone)]
pub struct Sent {
    pub topic: String,
    pub key: String,
    pub payload: Bytes,
}

impl Sent {
    pub fn decode(&self) -> DecodedFrame {
        wire::decode(&self.payload).expect("recorded frame should decode")
    }
}

/// Records every send in call order. Call number `fail_on` (0-based) is
/// rejected and not recorded.
#[derive(Default)]
pub struct Recorder {
    sent: Mutex<Vec<Sent>>,
    calls: Mutex<usize>,
    fail_on: Option<usize>,
    yield_between: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    /// Yield to the scheduler inside every send so concurrent publishes interleave.
    pub fn interleaving() -> Self {
        Self {
            yield_between: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError> {
        if self.yield_between {
            tokio::task::yield_now().await;
        }

        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.fail_on == Some(call) {
            return Err(TransportError::rejected(topic, "injected failure"));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent {
            topic: topic.to_owned(),
            key: key.to_owned(),
            payload,
        });
        Ok(Ack {
            partition: 0,
            offset: sent.len() as i64 - 1,
        })
    }
}

pub fn publisher<T: Transport>(transport: T, max_frame_size: i64) -> Publisher<T> {
    Publisher::new(
        transport,
        ChunkConfig::new(max_frame_size, TOPIC).expect("valid chunk config"),
    )
}

/// Deterministic payload: byte `i` is `i % 251`.
pub fn payload(len: usize) -> Bytes {
    (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
}

/// Concatenate decoded frames after checking they form one complete sequence.
pub fn reassemble(frames: &[DecodedFrame]) -> Bytes {
    let count = frames.first().map(|f| f.count).unwrap_or(0);
    assert_eq!(frames.len(), count, "frame count mismatch");
    let mut out = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, i, "frames out of order");
        assert_eq!(frame.count, count);
        assert_eq!(frame.message_id, frames[0].message_id);
        out.extend_from_slice(&frame.content);
    }
    out.into()
}

/// Recorded frames whose key is `id`, in call order.
pub fn frames_for(sent: &[Sent], id: &MessageId) -> Vec<DecodedFrame> {
    sent.iter()
        .filter(|s| s.key == id.as_str())
        .map(Sent::decode)
        .collect()
}
