use once_cell::sync::Lazy;
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::SeedUser;
use crate::models::User;
use crate::services::metrics::{LOGIN_ATTEMPTS_TOTAL, TOKEN_VALIDATIONS_TOTAL};
use crate::services::{Claims, JwtService, UserStore};
use crate::utils::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

/// Hash checked when the email is unknown so both failure paths cost one argon2 verify.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password(&Secret::new("dummy-password-for-unknown-users".to_string())).ok());

fn burn_verify(password: &Secret<String>) {
    if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(anyhow::anyhow!("Invalid email or password"))
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Lazy::force(&DUMMY_PASSWORD_HASH);
        Self { users, jwt }
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Exchange credentials for a token. Unknown email and wrong password fail identically.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: Secret<String>) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            burn_verify(&password);
            LOGIN_ATTEMPTS_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            return Err(invalid_credentials());
        };

        if !verify_password(&password, &user.password_hash)? {
            LOGIN_ATTEMPTS_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            return Err(invalid_credentials());
        }

        let token = self.jwt.generate_token(&user.email, &user.role)?;
        LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
        info!(user_id = %user.id, "User logged in");

        Ok(token)
    }

    /// Verify a raw `Authorization` header value.
    pub fn validate_header(&self, header: Option<&str>) -> Result<Claims, AppError> {
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            TOKEN_VALIDATIONS_TOTAL.with_label_values(&["missing"]).inc();
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Missing or malformed Authorization header"
            )));
        };

        match self.jwt.validate_token(token.trim()) {
            Ok(claims) => {
                TOKEN_VALIDATIONS_TOTAL.with_label_values(&["valid"]).inc();
                Ok(claims)
            }
            Err(e) => {
                TOKEN_VALIDATIONS_TOTAL.with_label_values(&["invalid"]).inc();
                warn!(error = %e, "Token validation failed");
                Err(AppError::Unauthorized(anyhow::anyhow!("Invalid token")))
            }
        }
    }

    /// Create the configured seed account if it does not exist yet.
    pub async fn seed(&self, seed: &SeedUser) -> Result<(), AppError> {
        let hash = hash_password(&seed.password)?;
        let user = User::new(seed.email.clone(), hash, seed.role.clone());

        if self.users.insert_if_absent(&user).await? {
            info!(email = %seed.email, role = %seed.role, "Seed user created");
        } else {
            info!(email = %seed.email, "Seed user already present");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_is_verifiable_and_matches_nothing_real() {
        let hash = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password(&Secret::new("password123".to_string()), hash).unwrap());
    }
}
