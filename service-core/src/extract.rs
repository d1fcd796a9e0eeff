//! Request extractors shared by the HTTP services.

use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use crate::error::AppError;
use validator::Validate;

/// JSON body that has passed `validator` checks.
///
/// Malformed JSON is a 400, failed field rules are a 422.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)).into_response()
        })?;

        value
            .validate()
            .map_err(|e| AppError::ValidationError(e).into_response())?;

        Ok(ValidatedJson(value))
    }
}
