//! Prometheus metrics for patient-service.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "patient_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Patient operations by outcome (`ok`, `conflict`, `not_found`, `billing_failed`, ...).
pub static PATIENT_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "patient_operations_total",
            "Total patient operations by type and outcome"
        ),
        &["operation", "outcome"]
    )
    .expect("Failed to register PATIENT_OPERATIONS_TOTAL")
});

pub fn init_metrics() {
    let _ = &*DB_QUERY_DURATION;
    let _ = &*PATIENT_OPERATIONS_TOTAL;
}

pub fn record_patient_operation(operation: &str, outcome: &str) {
    PATIENT_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Get metrics in Prometheus text format.
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
