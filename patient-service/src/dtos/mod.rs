pub mod patient;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body produced by `AppError`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "A patient with this email already exists: jane@example.com")]
    pub error: String,
    pub details: Option<String>,
}
