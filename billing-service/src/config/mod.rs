//! Configuration for billing-service.

use service_core::config::{
    get_env, parse_env, Config as CoreConfig, DatabaseConfig, TelemetryConfig,
};
use service_core::error::AppError;

#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    /// Port for the BillingService gRPC listener.
    pub grpc_port: u16,
}

impl BillingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let telemetry = TelemetryConfig::from_env();

        Ok(Self {
            common: CoreConfig::load("BILLING_SERVICE_PORT", 4001)?,
            service_name: get_env("SERVICE_NAME", Some("billing-service"), false)?,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: telemetry.log_level,
            otlp_endpoint: telemetry.otlp_endpoint,
            database: DatabaseConfig::from_env()?,
            grpc_port: parse_env("BILLING_GRPC_PORT", 9001)?,
        })
    }
}
