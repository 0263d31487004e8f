//! Kafka transport. One record per chunk, keyed by message id.
//!
//! Each send waits for the broker's delivery report before returning, so the
//! publisher never has more than one chunk of a payload in flight.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::config::ClientConfig;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use sink_core::config::{ConfigError, SinkConfig};
use sink_core::transport::{Ack, Transport, TransportError};

pub struct KafkaTransport {
    brokers: Vec<String>,
    properties: BTreeMap<String, String>,
    timeout: Duration,
    producer: Option<FutureProducer>,
}

impl KafkaTransport {
    /// Unconnected transport. Sends fail with `NotConnected` until [`connect`](Self::connect).
    pub fn new(config: &SinkConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            brokers: config.broker_list()?,
            properties: config.kafka.properties.clone(),
            timeout: config.delivery_timeout(),
            producer: None,
        })
    }

    pub fn connect(&mut self) -> Result<(), KafkaError> {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", self.brokers.join(","))
            .set("message.timeout.ms", self.timeout.as_millis().to_string());
        for (key, value) in &self.properties {
            client.set(key, value);
        }

        self.producer = Some(client.create()?);
        tracing::info!(brokers = ?self.brokers, "kafka producer created");
        Ok(())
    }

    /// Flush outstanding records and drop the producer.
    pub fn close(&mut self) {
        if let Some(producer) = self.producer.take() {
            if let Err(e) = producer.flush(Timeout::After(self.timeout)) {
                tracing::warn!(error = %e, "kafka flush on close failed");
            }
        }
    }
}

impl Drop for KafkaTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl Transport for KafkaTransport {
    async fn send(&self, topic: &str, key: &str, payload: Bytes) -> Result<Ack, TransportError> {
        let producer = self.producer.as_ref().ok_or(TransportError::NotConnected)?;
        let record = FutureRecord::to(topic).key(key).payload(payload.as_ref());

        match producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => Ok(Ack { partition, offset }),
            Err((KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut), _)) => {
                Err(TransportError::Timeout {
                    topic: topic.to_owned(),
                    timeout: self.timeout,
                })
            }
            Err((e, _)) => Err(TransportError::rejected(topic, e)),
        }
    }
}
