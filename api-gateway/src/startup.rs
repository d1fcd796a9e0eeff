//! Application startup and lifecycle management.

use service_core::error::AppError;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::services::init_metrics;
use crate::{build_router, AppState};

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState::new(config.routes)?;

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
            service = "api-gateway",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );
        axum::serve(self.listener, build_router(self.state)).await
    }
}
