//! Configuration for patient-service.

use service_core::config::{
    get_env, is_production, parse_env, Config as CoreConfig, DatabaseConfig, TelemetryConfig,
};
use service_core::error::AppError;
use service_core::events::PATIENT_TOPIC;

#[derive(Debug, Clone)]
pub struct PatientConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub billing: BillingServiceConfig,
    pub kafka: KafkaConfig,
}

/// Where the billing gRPC server lives.
#[derive(Debug, Clone)]
pub struct BillingServiceConfig {
    pub address: String,
    pub grpc_port: u16,
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub patient_topic: String,
}

impl PatientConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let is_prod = is_production();
        let telemetry = TelemetryConfig::from_env();

        Ok(Self {
            common: CoreConfig::load("PATIENT_SERVICE_PORT", 4000)?,
            service_name: "patient-service".to_string(),
            log_level: telemetry.log_level,
            otlp_endpoint: telemetry.otlp_endpoint,
            database: DatabaseConfig::from_env()?,
            billing: BillingServiceConfig {
                address: get_env("BILLING_SERVICE_ADDRESS", Some("localhost"), is_prod)?,
                grpc_port: parse_env("BILLING_SERVICE_GRPC_PORT", 9001)?,
            },
            kafka: KafkaConfig {
                bootstrap_servers: get_env(
                    "KAFKA_BOOTSTRAP_SERVERS",
                    Some("localhost:9092"),
                    is_prod,
                )?,
                patient_topic: get_env("KAFKA_PATIENT_TOPIC", Some(PATIENT_TOPIC), false)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_defaults_outside_production() {
        env::set_var("DATABASE_URL", "postgres://localhost/patients");
        env::remove_var("ENVIRONMENT");
        env::remove_var("PATIENT_SERVICE_PORT");
        env::remove_var("BILLING_SERVICE_ADDRESS");
        env::remove_var("BILLING_SERVICE_GRPC_PORT");
        env::remove_var("KAFKA_PATIENT_TOPIC");

        let config = PatientConfig::from_env().unwrap();
        assert_eq!(config.common.port, 4000);
        assert_eq!(config.billing.address, "localhost");
        assert_eq!(config.billing.grpc_port, 9001);
        assert_eq!(config.kafka.patient_topic, "patient");

        env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial]
    fn test_production_requires_billing_address() {
        env::set_var("DATABASE_URL", "postgres://localhost/patients");
        env::set_var("ENVIRONMENT", "prod");
        env::remove_var("BILLING_SERVICE_ADDRESS");

        let result = PatientConfig::from_env();
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        env::remove_var("ENVIRONMENT");
        env::remove_var("DATABASE_URL");
    }
}
