//! Configuration for analytics-service.

use service_core::config::{get_env, is_production, Config as CoreConfig, TelemetryConfig};
use service_core::error::AppError;
use service_core::events::PATIENT_TOPIC;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub kafka: ConsumerConfig,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let is_prod = is_production();
        let telemetry = TelemetryConfig::from_env();

        Ok(Self {
            common: CoreConfig::load("ANALYTICS_SERVICE_PORT", 4002)?,
            service_name: "analytics-service".to_string(),
            log_level: telemetry.log_level,
            otlp_endpoint: telemetry.otlp_endpoint,
            kafka: ConsumerConfig {
                brokers: get_env("KAFKA_BOOTSTRAP_SERVERS", Some("localhost:9092"), is_prod)?,
                group_id: get_env("KAFKA_GROUP_ID", Some("analytics-service"), false)?,
                topic: get_env("KAFKA_PATIENT_TOPIC", Some(PATIENT_TOPIC), false)?,
            },
        })
    }
}
