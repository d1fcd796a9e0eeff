//! Application startup and lifecycle management.

use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AuthConfig;
use crate::services::{init_metrics, AuthService, JwtService, PgUserStore};
use crate::{build_router, AppState};

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: AuthConfig) -> Result<Self, AppError> {
        init_metrics();

        let jwt = JwtService::new(&config.jwt).map_err(AppError::ConfigError)?;

        let store = PgUserStore::connect(
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

        let auth = AuthService::new(Arc::new(store), jwt);

        if let Some(seed) = &config.seed_user {
            auth.seed(seed)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Failed to seed user"))?;
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state: AppState { auth },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "auth-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );
        axum::serve(self.listener, build_router(self.state)).await
    }
}
