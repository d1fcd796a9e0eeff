//! Application startup and lifecycle management.

use service_core::error::AppError;
use service_core::grpc::{BillingClient, BillingClientConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::PatientConfig;
use crate::services::{init_metrics, KafkaEventPublisher, PatientService, PgPatientStore};
use crate::{build_router, AppState};

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: PatientConfig) -> Result<Self, AppError> {
        init_metrics();

        let store = PgPatientStore::connect(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to PostgreSQL"))?;
        store
            .run_migrations()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to run migrations"))?;

        let billing = BillingClient::new(BillingClientConfig::from_address(
            &config.billing.address,
            config.billing.grpc_port,
        ))
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid billing endpoint: {}", e)))?;

        let events =
            KafkaEventPublisher::new(&config.kafka.bootstrap_servers, &config.kafka.patient_topic)?;

        let state = AppState {
            patients: PatientService::new(Arc::new(store), Arc::new(billing), Arc::new(events)),
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "patient-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );
        axum::serve(self.listener, build_router(self.state)).await
    }
}
