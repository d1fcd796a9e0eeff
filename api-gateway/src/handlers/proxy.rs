//! Route handlers that strip the gateway prefix and forward upstream.
//!
//! Upstream paths are built from the raw request path, never from the
//! percent-decoded route capture.

use axum::{
    extract::{Request, State},
    response::Response,
};
use service_core::error::AppError;

use crate::services::rewrite_path;
use crate::AppState;

const AUTH_SERVICE: &str = "auth-service";
const PATIENT_SERVICE: &str = "patient-service";
const API_DOCS_PATH: &str = "/v3/api-docs";

const AUTH_PREFIX: &str = "/auth";
const PATIENTS_PREFIX: &str = "/api/patients";
const UPSTREAM_PATIENTS_PATH: &str = "/patients";

/// `/auth/{rest}` → auth-service `/{rest}`
pub async fn forward_auth(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    let path = rewrite_path(request.uri().path(), AUTH_PREFIX, "")?;
    state
        .forwarder
        .forward(AUTH_SERVICE, &state.upstreams.auth_service_url, &path, request)
        .await
}

/// `/api/patients` and `/api/patients/{rest}` → patient-service `/patients[/{rest}]`
pub async fn forward_patients(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    let path = rewrite_path(request.uri().path(), PATIENTS_PREFIX, UPSTREAM_PATIENTS_PATH)?;
    state
        .forwarder
        .forward(
            PATIENT_SERVICE,
            &state.upstreams.patient_service_url,
            &path,
            request,
        )
        .await
}

pub async fn patient_api_docs(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    state
        .forwarder
        .forward(
            PATIENT_SERVICE,
            &state.upstreams.patient_service_url,
            API_DOCS_PATH,
            request,
        )
        .await
}

pub async fn auth_api_docs(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    state
        .forwarder
        .forward(
            AUTH_SERVICE,
            &state.upstreams.auth_service_url,
            API_DOCS_PATH,
            request,
        )
        .await
}
