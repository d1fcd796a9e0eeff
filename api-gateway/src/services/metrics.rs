use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

/// Forwarded requests by upstream and response status (`error` on transport failure).
pub static UPSTREAM_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("gateway_upstream_requests_total", "Requests forwarded to upstream services"),
        &["upstream", "status"]
    )
    .expect("Failed to register UPSTREAM_REQUESTS_TOTAL")
});

pub static UPSTREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "gateway_upstream_request_duration_seconds",
            "Upstream round-trip time"
        ),
        &["upstream"]
    )
    .expect("Failed to register UPSTREAM_REQUEST_DURATION")
});

pub static TOKEN_CHECKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("gateway_token_checks_total", "JWT filter decisions"),
        &["outcome"]
    )
    .expect("Failed to register TOKEN_CHECKS_TOTAL")
});

pub fn init_metrics() {
    let _ = &*UPSTREAM_REQUESTS_TOTAL;
    let _ = &*UPSTREAM_REQUEST_DURATION;
    let _ = &*TOKEN_CHECKS_TOTAL;
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
