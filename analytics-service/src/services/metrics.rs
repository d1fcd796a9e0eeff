//! Prometheus metrics for analytics-service.

use once_cell::sync::Lazy;
use prometheus::{opts, register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

/// Consumed messages by outcome (`ok`, `decode_error`, `empty`).
pub static EVENTS_CONSUMED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "analytics_events_consumed_total",
            "Patient events consumed from Kafka by type and outcome"
        ),
        &["event_type", "outcome"]
    )
    .expect("Failed to register EVENTS_CONSUMED_TOTAL")
});

pub static CONSUMER_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "analytics_consumer_errors_total",
            "Kafka consumer errors that forced a backoff"
        ),
        &["topic"]
    )
    .expect("Failed to register CONSUMER_ERRORS_TOTAL")
});

pub fn init_metrics() {
    let _ = &*EVENTS_CONSUMED_TOTAL;
    let _ = &*CONSUMER_ERRORS_TOTAL;
}

pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
