//! sink-core — chunking, framing, and ordered publishing for the OpenNMS Sink API.
//! The sender binary and any other transport binding depend on this one.

pub mod chunk;
pub mod config;
pub mod identity;
pub mod publish;
pub mod transport;
pub mod wire;


pub use config::{ChunkConfig, ConfigError, SinkConfig};
pub use identity::{IdSource, MessageId, RandomIds};
pub use publish::{PublishError, PublishReceipt, Publisher};
pub use transport::{Ack, Transport, TransportError};
pub use wire::{DecodedFrame, Frame, WireError};
