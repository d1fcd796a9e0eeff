//! Metrics module for billing-service.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "billing_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Account operations counter
pub static ACCOUNT_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// gRPC request counter
pub static GRPC_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// gRPC request duration histogram
pub static GRPC_REQUEST_DURATION: OnceLock<HistogramVec> = OnceLock::new();

/// Error counter for alerting
pub static ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    ACCOUNT_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_account_operations_total",
                "Total billing account operations by type and outcome"
            ),
            &["operation", "outcome"]
        )
        .expect("Failed to register ACCOUNT_OPERATIONS_TOTAL")
    });

    GRPC_REQUESTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("billing_grpc_requests_total", "Total gRPC requests"),
            &["method", "status"]
        )
        .expect("Failed to register GRPC_REQUESTS_TOTAL")
    });

    GRPC_REQUEST_DURATION.get_or_init(|| {
        register_histogram_vec!(
            histogram_opts!(
                "billing_grpc_request_duration_seconds",
                "gRPC request duration",
                vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
            ),
            &["method"]
        )
        .expect("Failed to register GRPC_REQUEST_DURATION")
    });

    ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("billing_errors_total", "Total errors by type for alerting"),
            &["error_type", "method"]
        )
        .expect("Failed to register ERRORS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
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

/// Record an account operation (`open`, `lookup`) and its outcome.
pub fn record_account_operation(operation: &str, outcome: &str) {
    if let Some(counter) = ACCOUNT_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, outcome]).inc();
    }
}

pub fn record_grpc_request(method: &str, status: &str) {
    if let Some(counter) = GRPC_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, status]).inc();
    }
}

pub fn record_grpc_request_duration(method: &str, duration_secs: f64) {
    if let Some(histogram) = GRPC_REQUEST_DURATION.get() {
        histogram
            .with_label_values(&[method])
            .observe(duration_secs);
    }
}

/// Record an error for alerting.
pub fn record_error(error_type: &str, method: &str) {
    if let Some(counter) = ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type, method]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_show_up_in_export() {
        init_metrics();
        record_grpc_request("CreateBillingAccount", "ok");
        record_account_operation("open", "created");

        let output = get_metrics();
        assert!(output.contains("billing_grpc_requests_total"));
        assert!(output.contains("billing_account_operations_total"));
    }
}
