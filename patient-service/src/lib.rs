pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    middleware::from_fn,
    routing::{get, put},
    Json, Router,
};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::services::PatientService;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::list_patients,
        handlers::create_patient,
        handlers::update_patient,
        handlers::delete_patient,
    ),
    components(schemas(
        dtos::patient::PatientRequest,
        dtos::patient::PatientResponse,
        dtos::ErrorResponse,
    )),
    tags(
        (name = "Patient", description = "API for managing patients"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub patients: PatientService,
}

/// Path the OpenAPI document is served on; the gateway proxies it.
pub const OPENAPI_PATH: &str = "/v3/api-docs";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/:id",
            put(handlers::update_patient).delete(handlers::delete_patient),
        )
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(SwaggerUi::new("/swagger-ui").url("/swagger-ui/openapi.json", ApiDoc::openapi()))
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
