//! Kafka consumer for patient events.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use service_core::error::AppError;
use service_core::events::PatientEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::ConsumerConfig;
use crate::services::metrics::{CONSUMER_ERRORS_TOTAL, EVENTS_CONSUMED_TOTAL};
use crate::services::tally::{known_event_type, EventTally};

/// Pause after a broker error before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Decode one payload, log it and update the tallies.
///
/// Returns the event when the payload decoded. Failures are logged and
/// counted; they never propagate.
pub fn process_payload(tally: &EventTally, payload: Option<&[u8]>) -> Option<PatientEvent> {
    let Some(payload) = payload.filter(|bytes| !bytes.is_empty()) else {
        warn!("Received Kafka message with an empty payload, skipping");
        tally.record_decode_failure();
        EVENTS_CONSUMED_TOTAL
            .with_label_values(&["", "empty"])
            .inc();
        return None;
    };

    match PatientEvent::from_bytes(payload) {
        Ok(event) => {
            info!(
                patient_id = %event.patient_id,
                name = %event.name,
                email = %event.email,
                event_type = %event.event_type,
                "Received patient event"
            );
            tally.record_event(&event.event_type);
            EVENTS_CONSUMED_TOTAL
                .with_label_values(&[known_event_type(&event.event_type), "ok"])
                .inc();
            Some(event)
        }
        Err(e) => {
            error!(error = %e, "Error deserializing event");
            tally.record_decode_failure();
            EVENTS_CONSUMED_TOTAL
                .with_label_values(&["", "decode_error"])
                .inc();
            None
        }
    }
}

pub struct PatientEventConsumer {
    consumer: StreamConsumer,
    tally: Arc<EventTally>,
    topic: String,
}

impl PatientEventConsumer {
    pub fn new(config: &ConsumerConfig, tally: Arc<EventTally>) -> Result<Self, AppError> {
        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topic = %config.topic,
            "Initializing patient event consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| {
                AppError::MessagingError(format!("Failed to create Kafka consumer: {}", e))
            })?;

        consumer.subscribe(&[config.topic.as_str()]).map_err(|e| {
            AppError::MessagingError(format!("Failed to subscribe to topic: {}", e))
        })?;

        info!(topic = %config.topic, "Subscribed to Kafka topic");

        Ok(Self {
            consumer,
            tally,
            topic: config.topic.clone(),
        })
    }

    /// Consume until the task is dropped. Broker errors back off and resume.
    pub async fn start_consuming(self: Arc<Self>) {
        info!("Starting patient event consumer loop");

        loop {
            if let Err(e) = self.consume_loop().await {
                CONSUMER_ERRORS_TOTAL
                    .with_label_values(&[self.topic.as_str()])
                    .inc();
                error!(error = %e, "Kafka consumer error, retrying in {:?}", ERROR_BACKOFF);
                sleep(ERROR_BACKOFF).await;
            }
        }
    }

    async fn consume_loop(&self) -> Result<(), AppError> {
        loop {
            let message = self
                .consumer
                .recv()
                .await
                .map_err(|e| AppError::MessagingError(format!("Kafka recv failed: {}", e)))?;
            process_payload(&self.tally, message.payload());
        }
    }
}
