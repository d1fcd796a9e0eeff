//! Configuration for api-gateway.

use service_core::config::{get_env, is_production, parse_env, Config as CoreConfig, TelemetryConfig};
use service_core::error::AppError;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub routes: UpstreamConfig,
}

/// Base URLs of the services the gateway fronts, without trailing slash.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub auth_service_url: String,
    pub patient_service_url: String,
    pub request_timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn new(auth_service_url: &str, patient_service_url: &str) -> Self {
        Self {
            auth_service_url: auth_service_url.trim_end_matches('/').to_string(),
            patient_service_url: patient_service_url.trim_end_matches('/').to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let is_prod = is_production();
        let telemetry = TelemetryConfig::from_env();

        let mut routes = UpstreamConfig::new(
            &get_env("AUTH_SERVICE_URL", Some("http://localhost:4005"), is_prod)?,
            &get_env("PATIENT_SERVICE_URL", Some("http://localhost:4000"), is_prod)?,
        );
        routes.request_timeout_secs = parse_env("GATEWAY_REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            common: CoreConfig::load("API_GATEWAY_PORT", 4004)?,
            service_name: "api-gateway".to_string(),
            log_level: telemetry.log_level,
            otlp_endpoint: telemetry.otlp_endpoint,
            routes,
        })
    }
}
