//! Application startup and lifecycle management.

use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AnalyticsConfig;
use crate::services::{init_metrics, EventTally, PatientEventConsumer};
use crate::{build_router, AppState};

pub struct Application {
    port: u16,
    listener: TcpListener,
    consumer: Arc<PatientEventConsumer>,
    tally: Arc<EventTally>,
}

impl Application {
    pub async fn build(config: AnalyticsConfig) -> Result<Self, AppError> {
        init_metrics();

        let tally = Arc::new(EventTally::new());
        let consumer = Arc::new(PatientEventConsumer::new(&config.kafka, tally.clone())?);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            consumer,
            tally,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve HTTP while the consumer runs as a background task.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let consumer_task = tokio::spawn(self.consumer.clone().start_consuming());

        tracing::info!(
            service = "analytics-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        let router = build_router(AppState { tally: self.tally });
        let result = axum::serve(self.listener, router).await;
        consumer_task.abort();
        result
    }
}
