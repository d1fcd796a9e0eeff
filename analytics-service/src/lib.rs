pub mod config;
pub mod services;
pub mod startup;

use axum::{
    extract::State, http::StatusCode, middleware::from_fn, response::IntoResponse, routing::get,
    Json, Router,
};
use serde_json::json;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{get_metrics, EventTally};

#[derive(Clone)]
pub struct AppState {
    pub tally: Arc<EventTally>,
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "analytics-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.tally.summary())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/analytics/summary", get(summary))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
}
