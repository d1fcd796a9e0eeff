pub mod config;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::UpstreamConfig;
use crate::middleware::jwt_filter;
use crate::services::{Forwarder, TokenValidator};

#[derive(Clone)]
pub struct AppState {
    pub upstreams: Arc<UpstreamConfig>,
    pub forwarder: Forwarder,
    pub validator: TokenValidator,
}

impl AppState {
    pub fn new(upstreams: UpstreamConfig) -> Result<Self, AppError> {
        let forwarder = Forwarder::new(Duration::from_secs(upstreams.request_timeout_secs))?;
        let validator = TokenValidator::new(forwarder.client().clone(), &upstreams.auth_service_url);
        Ok(Self {
            upstreams: Arc::new(upstreams),
            forwarder,
            validator,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/patients", any(handlers::forward_patients))
        .route("/api/patients/*rest", any(handlers::forward_patients))
        .route_layer(from_fn_with_state(state.clone(), jwt_filter));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/auth/*rest", any(handlers::forward_auth))
        .route("/api-docs/patients", get(handlers::patient_api_docs))
        .route("/api-docs/auth", get(handlers::auth_api_docs))
        .merge(protected)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
}
