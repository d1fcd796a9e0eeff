use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "testuser@test.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub token: String,
}

/// Claims echoed back by `/validate`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    #[schema(example = "testuser@test.com")]
    pub email: String,
    #[schema(example = "ADMIN")]
    pub role: String,
    pub expires_at: i64,
}
