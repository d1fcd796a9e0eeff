//! Application startup: one pool shared by the HTTP and gRPC listeners.

use service_core::error::AppError;
use service_core::grpc::{create_reflection_service, GrpcServerBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::BillingConfig;
use crate::grpc::proto::{billing_service_server::BillingServiceServer, FILE_DESCRIPTOR_SET};
use crate::grpc::{trace_context_interceptor, BillingServiceImpl};
use crate::services::{init_metrics, Database};
use crate::{build_router, AppState};

async fn bind(port: u16, kind: &str) -> Result<(TcpListener, u16), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!(error = %e, addr = %addr, listener = kind, "Failed to bind listener");
        AppError::from(e)
    })?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

pub struct Application {
    http: (TcpListener, u16),
    grpc: (TcpListener, u16),
    db: Arc<Database>,
}

impl Application {
    /// Connect, migrate and bind both listeners.
    pub async fn build(config: BillingConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to PostgreSQL"))?;
        db.run_migrations()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to run migrations"))?;

        Ok(Self {
            http: bind(config.common.port, "http").await?,
            grpc: bind(config.grpc_port, "grpc").await?,
            db: Arc::new(db),
        })
    }

    pub fn http_port(&self) -> u16 {
        self.http.1
    }

    pub fn grpc_port(&self) -> u16 {
        self.grpc.1
    }

    /// Serve HTTP and gRPC until either server stops.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let (http_listener, http_port) = self.http;
        let (grpc_listener, grpc_port) = self.grpc;

        let (mut health_reporter, grpc_health) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<BillingServiceServer<BillingServiceImpl>>()
            .await;

        let reflection = create_reflection_service(&[FILE_DESCRIPTOR_SET])
            .map_err(|e| std::io::Error::other(format!("Failed to build reflection: {}", e)))?;

        let grpc_server = GrpcServerBuilder::new("billing-service")
            .build_server()
            .layer(
                TraceLayer::new_for_grpc()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            )
            .add_service(grpc_health)
            .add_service(reflection)
            .add_service(BillingServiceServer::with_interceptor(
                BillingServiceImpl::new(self.db.clone()),
                trace_context_interceptor,
            ))
            .serve_with_incoming(TcpListenerStream::new(grpc_listener));

        let http_server = axum::serve(http_listener, build_router(AppState { db: self.db }));

        tracing::info!(
            service = "billing-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port,
            grpc_port,
            "Service ready to accept connections"
        );

        tokio::select! {
            result = http_server => result,
            result = grpc_server => result.map_err(|e| {
                tracing::error!(error = %e, "gRPC server error");
                std::io::Error::other(format!("gRPC server error: {}", e))
            }),
        }
    }
}
