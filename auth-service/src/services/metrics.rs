use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("auth_db_query_duration_seconds", "Database query duration"),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Login attempts by outcome (`success`, `invalid_credentials`).
pub static LOGIN_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("auth_login_attempts_total", "Login attempts by outcome"),
        &["outcome"]
    )
    .expect("Failed to register LOGIN_ATTEMPTS_TOTAL")
});

/// Token validations by outcome (`valid`, `invalid`, `missing`).
pub static TOKEN_VALIDATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("auth_token_validations_total", "Token validations by outcome"),
        &["outcome"]
    )
    .expect("Failed to register TOKEN_VALIDATIONS_TOTAL")
});

pub fn init_metrics() {
    let _ = &*DB_QUERY_DURATION;
    let _ = &*LOGIN_ATTEMPTS_TOTAL;
    let _ = &*TOKEN_VALIDATIONS_TOTAL;
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
