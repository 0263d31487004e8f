//! Transport bindings for the sender.
//!
//! `kafka` is the production binding and needs the `kafka` cargo feature
//! (it links librdkafka). `dry_run` needs nothing and only logs.

pub mod dry_run;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use dry_run::DryRunTransport;
#[cfg(feature = "kafka")]
pub use kafka::KafkaTransport;
