use axum::http::header::AUTHORIZATION;
use service_core::error::AppError;
use service_core::observability::inject_trace_context;
use tracing::{debug, warn};

use crate::services::metrics::TOKEN_CHECKS_TOTAL;

/// Delegates bearer token checks to auth-service `GET /validate`.
#[derive(Clone)]
pub struct TokenValidator {
    client: reqwest::Client,
    validate_url: String,
}

impl TokenValidator {
    pub fn new(client: reqwest::Client, auth_service_url: &str) -> Self {
        Self {
            client,
            validate_url: format!("{}/validate", auth_service_url),
        }
    }

    /// Accept the request only if auth-service answers 2xx for this header.
    ///
    /// Headers without the `Bearer ` prefix are refused locally.
    pub async fn check(&self, authorization: Option<&str>) -> Result<(), AppError> {
        let Some(header) = authorization.filter(|h| h.starts_with("Bearer ")) else {
            TOKEN_CHECKS_TOTAL.with_label_values(&["missing"]).inc();
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Missing or malformed Authorization header"
            )));
        };

        let mut headers = reqwest::header::HeaderMap::new();
        inject_trace_context(&mut headers);

        let response = self
            .client
            .get(&self.validate_url)
            .headers(headers)
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| {
                TOKEN_CHECKS_TOTAL.with_label_values(&["unreachable"]).inc();
                warn!(error = %e, "auth-service unreachable during token validation");
                AppError::BadGateway("auth-service unreachable".to_string())
            })?;

        if response.status().is_success() {
            TOKEN_CHECKS_TOTAL.with_label_values(&["valid"]).inc();
            debug!("Token accepted by auth-service");
            Ok(())
        } else {
            TOKEN_CHECKS_TOTAL.with_label_values(&["rejected"]).inc();
            debug!(status = %response.status(), "Token rejected by auth-service");
            Err(AppError::Unauthorized(anyhow::anyhow!("Invalid token")))
        }
    }
}
