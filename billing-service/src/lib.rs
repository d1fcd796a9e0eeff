//! Billing Service - billing accounts opened for registered patients.

pub mod config;
pub mod grpc;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use axum::{middleware::from_fn, routing::get, Router};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// Operational HTTP surface next to the gRPC server.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
}
