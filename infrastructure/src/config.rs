//! Synthesizer settings: built-in defaults overridden by `INFRA_*` environment variables.

use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::StackError;

/// LocalStack exposes MSK brokers on these host ports.
const LOCALSTACK_KAFKA_BROKERS: &str =
    "localhost.localstack.cloud:4510,localhost.localstack.cloud:4511,localhost.localstack.cloud:4512";

/// Signing key baked into the local deployment (base64, 32 bytes decoded).
const LOCAL_JWT_SECRET: &str = "QWtVajVpZjUxcTMzcTJscU9aOFpqT3ZLMVVDTXRndEo=";

#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    pub stack_name: String,
    pub output_path: PathBuf,
    pub max_azs: u32,
    pub kafka_broker_nodes: u32,
    pub kafka_bootstrap_servers: String,
    pub jwt_secret: Secret<String>,
    /// Host the patient service dials for billing gRPC. LocalStack has no
    /// Cloud Map resolution, so this defaults to the Docker host.
    pub billing_service_address: String,
    pub billing_grpc_port: u16,
    pub auth_service_url: String,
    pub patient_service_url: String,
}

impl StackConfig {
    pub fn load() -> Result<Self, StackError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("stack_name", "localstack")?
            .set_default("output_path", "cdk.out/localstack.template.json")?
            .set_default("max_azs", 2)?
            .set_default("kafka_broker_nodes", 4)?
            .set_default("kafka_bootstrap_servers", LOCALSTACK_KAFKA_BROKERS)?
            .set_default("jwt_secret", LOCAL_JWT_SECRET)?
            .set_default("billing_service_address", "host.docker.internal")?
            .set_default("billing_grpc_port", 9001)?
            .set_default("auth_service_url", "http://host.docker.internal:4005")?
            .set_default("patient_service_url", "http://host.docker.internal:4000")?
            .add_source(
                config::Environment::with_prefix("INFRA")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
