use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::AppState;

/// Let the request through only when auth-service accepts its bearer token.
pub async fn jwt_filter(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    state.validator.check(authorization).await?;

    Ok(next.run(request).await)
}
