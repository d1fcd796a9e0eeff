use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Settings every service shares, layered from lowest to highest precedence:
/// `default_port`, an optional `configuration` file, `APP__*` variables and
/// finally the service's own port variable.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn load(port_env: &str, default_port: u16) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .set_default("port", default_port)?
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", env::var(port_env).ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// PostgreSQL connection settings shared by the database-backed services.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let is_prod = is_production();
        Ok(Self {
            url: get_env("DATABASE_URL", None, is_prod)?,
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1)?,
        })
    }
}

/// Observability settings read by every service.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

pub fn is_production() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

/// Read an environment variable, falling back to `default` outside production.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Parse an optional environment variable, using `default` when unset.
pub fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}
