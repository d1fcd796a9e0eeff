use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::Secret;
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::{
    dtos::auth::{LoginRequest, LoginResponse, ValidateResponse},
    AppState,
};

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = state
        .auth
        .login(&req.email, Secret::new(req.password))
        .await?;
    Ok((StatusCode::OK, Json(LoginResponse { token })))
}

/// Check a bearer token
#[utoipa::path(
    get,
    path = "/validate",
    responses(
        (status = 200, description = "Token is valid", body = ValidateResponse),
        (status = 401, description = "Missing, malformed or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let claims = state.auth.validate_header(header)?;

    Ok(Json(ValidateResponse {
        email: claims.sub,
        role: claims.role,
        expires_at: claims.exp,
    }))
}
