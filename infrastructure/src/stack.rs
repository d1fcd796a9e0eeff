//! The platform deployment: network, databases, Kafka and the ECS services.

use secrecy::ExposeSecret;
use tracing::info;

use crate::config::StackConfig;
use crate::constructs::{
    Cluster, Database, DatabaseProps, FargateService, FargateServiceProps, LoadBalancedService,
    MskCluster, MskClusterProps, Vpc,
};
use crate::error::StackError;
use crate::template::Template;

pub const VPC_ID: &str = "PatientManagementVpc";
pub const CLUSTER_ID: &str = "PatientManagementCluster";
pub const CLOUD_MAP_NAMESPACE: &str = "patient-management.local";
pub const MSK_CLUSTER_ID: &str = "MskCluster";

pub const AUTH_DB_ID: &str = "AuthServiceDb";
pub const PATIENT_DB_ID: &str = "PatientServiceDb";
pub const AUTH_DB_HEALTH_CHECK_ID: &str = "AuthServiceDbHealthCheck";
pub const PATIENT_DB_HEALTH_CHECK_ID: &str = "PatientServiceDbHealthCheck";

pub const AUTH_SERVICE_ID: &str = "AuthService";
pub const BILLING_SERVICE_ID: &str = "BillingService";
pub const ANALYTICS_SERVICE_ID: &str = "AnalyticsService";
pub const PATIENT_SERVICE_ID: &str = "PatientService";
pub const API_GATEWAY_ID: &str = "APIGatewayService";

const GATEWAY_GRACE_PERIOD_SECS: u32 = 60;

/// Build the full template. Fails if the settings describe an impossible topology.
pub fn synthesize(config: &StackConfig) -> Result<Template, StackError> {
    let mut template = Template::new();
    template.description = Some(format!(
        "Patient management platform ({})",
        config.stack_name
    ));

    let vpc = Vpc::create(&mut template, VPC_ID, config.max_azs)?;

    let db_props = DatabaseProps::default();
    let auth_db = Database::create(&mut template, AUTH_DB_ID, "auth-service-db", &vpc, &db_props)?;
    let patient_db = Database::create(
        &mut template,
        PATIENT_DB_ID,
        "patient-service-db",
        &vpc,
        &db_props,
    )?;
    let auth_db_health = auth_db.add_health_check(&mut template, AUTH_DB_HEALTH_CHECK_ID)?;
    let patient_db_health =
        patient_db.add_health_check(&mut template, PATIENT_DB_HEALTH_CHECK_ID)?;

    let msk = MskCluster::create(
        &mut template,
        MSK_CLUSTER_ID,
        &vpc,
        &MskClusterProps {
            broker_nodes: config.kafka_broker_nodes,
            ..Default::default()
        },
    )?;

    let cluster = Cluster::create(&mut template, CLUSTER_ID, &vpc, CLOUD_MAP_NAMESPACE)?;

    let service = |image: &str, ports: &[u16]| {
        FargateServiceProps::new(image, ports)
            .env("KAFKA_BOOTSTRAP_SERVERS", config.kafka_bootstrap_servers.as_str())
    };

    let auth = FargateService::create(
        &mut template,
        AUTH_SERVICE_ID,
        &cluster,
        &vpc,
        &service("auth-service", &[4005])
            .env("DATABASE_URL", auth_db.connection_url())
            .env("JWT_SECRET", config.jwt_secret.expose_secret().as_str()),
    )?;
    template.add_dependency(&auth.id, &auth_db_health)?;
    template.add_dependency(&auth.id, &auth_db.id)?;

    let billing = FargateService::create(
        &mut template,
        BILLING_SERVICE_ID,
        &cluster,
        &vpc,
        &service("billing-service", &[4001, 9001]),
    )?;

    let analytics = FargateService::create(
        &mut template,
        ANALYTICS_SERVICE_ID,
        &cluster,
        &vpc,
        &service("analytics-service", &[4002]),
    )?;
    template.add_dependency(&analytics.id, &msk.id)?;

    let patient = FargateService::create(
        &mut template,
        PATIENT_SERVICE_ID,
        &cluster,
        &vpc,
        &service("patient-service", &[4000])
            .env("DATABASE_URL", patient_db.connection_url())
            .env("BILLING_SERVICE_ADDRESS", config.billing_service_address.as_str())
            .env("BILLING_SERVICE_GRPC_PORT", config.billing_grpc_port.to_string()),
    )?;
    for on in [&patient_db.id, &patient_db_health, &billing.id, &msk.id] {
        template.add_dependency(&patient.id, on)?;
    }

    LoadBalancedService::create(
        &mut template,
        API_GATEWAY_ID,
        &cluster,
        &vpc,
        &FargateServiceProps::new("api-gateway", &[4004])
            .env("ENVIRONMENT", "prod")
            .env("AUTH_SERVICE_URL", config.auth_service_url.as_str())
            .env("PATIENT_SERVICE_URL", config.patient_service_url.as_str()),
        GATEWAY_GRACE_PERIOD_SECS,
    )?;

    template.validate()?;

    info!(
        stack = %config.stack_name,
        resources = template.resources.len(),
        "Stack synthesized"
    );

    Ok(template)
}
