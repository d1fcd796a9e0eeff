use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Issues and verifies HS256 tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl JwtService {
    /// Build the service from a base64-encoded HMAC secret.
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let key = STANDARD
            .decode(config.secret.expose_secret().trim())
            .map_err(|e| anyhow::anyhow!("JWT_SECRET is not valid base64: {}", e))?;

        if key.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must decode to at least 32 bytes, got {}",
                key.len()
            ));
        }

        tracing::info!("JWT service initialized with HS256 key");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            expiry_hours: config.expiry_hours,
        })
    }

    pub fn generate_token(&self, email: &str, role: &str) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
    }

    /// Verify signature and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))
    }
}
