//! Apache Kafka producer backed by librdkafka.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rdkafka::client::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use rdkafka::types::RDKafkaErrorCode;
use tracing::{debug, error, info};

use crate::config::BrokerConfig;

use super::client::{BrokerClient, BrokerConnector, BrokerError};

/// Creates a [`KafkaClient`] from a [`BrokerConfig`].
#[derive(Clone, Debug)]
pub struct KafkaConnector {
    config: BrokerConfig,
}

impl KafkaConnector {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }

    fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config.set("bootstrap.servers", &self.config.brokers);
        client_config.set(
            "message.timeout.ms",
            self.config.message_timeout_ms.to_string(),
        );

        if let Some(ref client_id) = self.config.client_id {
            client_config.set("client.id", client_id);
        }

        for (key, value) in &self.config.options {
            client_config.set(key, value);
        }

        client_config
    }
}

impl BrokerConnector for KafkaConnector {
    type Client = KafkaClient;

    fn connect(&self) -> Result<KafkaClient, BrokerError> {
        info!(brokers = %self.config.brokers, "creating Kafka producer");

        let producer: BaseProducer<DeliveryTracker> = self
            .client_config()
            .create_with_context(DeliveryTracker::default())
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        Ok(KafkaClient { producer })
    }
}

/// Producer context that remembers failed delivery reports.
///
/// librdkafka drops a record once `message.timeout.ms` expires and counts it
/// as no longer in flight, so `flush` alone would report success.
#[derive(Default)]
struct DeliveryTracker {
    failure: Mutex<Option<String>>,
}

impl DeliveryTracker {
    fn record_failure(&self, topic: &str, key: Option<&[u8]>, err: &KafkaError) {
        let key = key.map(String::from_utf8_lossy).unwrap_or_default();
        error!(topic, key = %key, error = %err, "record was not delivered");

        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if failure.is_none() {
            *failure = Some(format!("topic {topic} (key {key}): {err}"));
        }
    }

    /// Take the first failure reported since the last call.
    fn take_failure(&self) -> Option<BrokerError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(BrokerError::Delivery)
    }
}

impl ClientContext for DeliveryTracker {}

impl ProducerContext for DeliveryTracker {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        if let Err((err, message)) = result {
            self.record_failure(message.topic(), message.key(), err);
        }
    }
}

/// A connected Kafka producer.
pub struct KafkaClient {
    producer: BaseProducer<DeliveryTracker>,
}

impl BrokerClient for KafkaClient {
    fn enqueue(&mut self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        // No partition set: librdkafka's partitioner hashes the key.
        let record = BaseRecord::<str, [u8]>::to(topic).key(key).payload(payload);
        self.producer
            .send(record)
            .map_err(|(e, _)| BrokerError::Enqueue(e.to_string()))
    }

    fn poll(&mut self, timeout: Duration) {
        self.producer.poll(timeout);
    }

    fn flush(&mut self, timeout: Duration) -> Result<(), BrokerError> {
        debug!(in_flight = self.producer.in_flight_count(), "flushing Kafka producer");
        let flushed = self.producer.flush(timeout);

        // Delivery reports are served during flush; a lost record wins over
        // whatever flush itself returned.
        if let Some(failure) = self.producer.context().take_failure() {
            return Err(failure);
        }

        flushed.map_err(|err| match err {
            KafkaError::Flush(RDKafkaErrorCode::OperationTimedOut) => {
                BrokerError::FlushTimeout(timeout)
            }
            other => BrokerError::from(other),
        })
    }
}

impl From<KafkaError> for BrokerError {
    fn from(err: KafkaError) -> Self {
        match &err {
            KafkaError::ClientCreation(_) => BrokerError::Connect(err.to_string()),
            KafkaError::MessageProduction(_) => BrokerError::Enqueue(err.to_string()),
            _ => BrokerError::Broker(err.to_string()),
        }
    }
}
