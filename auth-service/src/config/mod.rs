//! Configuration for auth-service.

use secrecy::Secret;
use service_core::config::{
    get_env, is_production, parse_env, Config as CoreConfig, DatabaseConfig, TelemetryConfig,
};
use service_core::error::AppError;
use std::env;

/// Development-only signing secret (base64). Production must set `JWT_SECRET`.
const DEV_JWT_SECRET: &str = "ZGV2LW9ubHktand0LXNlY3JldC1yZXBsYWNlLW1lLWluLXByb2R1Y3Rpb24=";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub seed_user: Option<SeedUser>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Base64-encoded HMAC key.
    pub secret: Secret<String>,
    pub expiry_hours: i64,
}

/// Account created at startup when both seed variables are present.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: Secret<String>,
    pub role: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let is_prod = is_production();
        let telemetry = TelemetryConfig::from_env();

        let seed_user = match (env::var("AUTH_SEED_EMAIL"), env::var("AUTH_SEED_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SeedUser {
                    email,
                    password: Secret::new(password),
                    role: get_env("AUTH_SEED_ROLE", Some("ADMIN"), false)?,
                })
            }
            _ => None,
        };

        Ok(Self {
            common: CoreConfig::load("AUTH_SERVICE_PORT", 4005)?,
            service_name: "auth-service".to_string(),
            log_level: telemetry.log_level,
            otlp_endpoint: telemetry.otlp_endpoint,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig {
                secret: Secret::new(get_env("JWT_SECRET", Some(DEV_JWT_SECRET), is_prod)?),
                expiry_hours: parse_env("JWT_EXPIRY_HOURS", 10)?,
            },
            seed_user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_seed_user_requires_both_variables() {
        env::set_var("DATABASE_URL", "postgres://localhost/auth");
        env::set_var("AUTH_SEED_EMAIL", "admin@example.com");
        env::remove_var("AUTH_SEED_PASSWORD");

        let config = AuthConfig::from_env().unwrap();
        assert!(config.seed_user.is_none());

        env::set_var("AUTH_SEED_PASSWORD", "password123");
        let config = AuthConfig::from_env().unwrap();
        let seed = config.seed_user.unwrap();
        assert_eq!(seed.email, "admin@example.com");
        assert_eq!(seed.role, "ADMIN");

        env::remove_var("AUTH_SEED_EMAIL");
        env::remove_var("AUTH_SEED_PASSWORD");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial]
    fn test_jwt_defaults() {
        env::set_var("DATABASE_URL", "postgres://localhost/auth");
        env::remove_var("ENVIRONMENT");
        env::remove_var("JWT_EXPIRY_HOURS");

        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.jwt.expiry_hours, 10);
        assert_eq!(config.common.port, 4005);

        env::remove_var("DATABASE_URL");
    }
}
