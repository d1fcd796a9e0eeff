//! Patient event publishing to Kafka.

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use service_core::error::AppError;
use service_core::events::PatientEvent;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Publishes patient lifecycle events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &PatientEvent) -> Result<(), AppError>;
}

/// rdkafka producer writing protobuf-encoded [`PatientEvent`]s, keyed by patient id.
#[derive(Clone)]
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, AppError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create::<FutureProducer>()
            .map_err(|e| AppError::MessagingError(format!("Failed to create producer: {}", e)))?;

        Ok(Self {
            producer,
            topic: topic.into(),
            timeout: Duration::from_secs(5),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, event: &PatientEvent) -> Result<(), AppError> {
        let payload = event.to_bytes();
        let record = FutureRecord::to(&self.topic)
            .payload(&payload)
            .key(&event.patient_id);

        debug!(
            topic = %self.topic,
            key = %event.patient_id,
            event_type = %event.event_type,
            "Publishing patient event"
        );

        match timeout(self.timeout, self.producer.send(record, self.timeout)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err((e, _))) => Err(AppError::MessagingError(e.to_string())),
            Err(_) => {
                warn!("Kafka send timed out after {:?}", self.timeout);
                Err(AppError::MessagingError("Kafka publish timeout".into()))
            }
        }
    }
}
