//! Coordinator server

use crate::common::{CoordinatorConfig, Result};
use crate::coordinator::grpc::CoordGrpcService;
use crate::coordinator::http::{create_router, CoordState};
use crate::coordinator::state::CoordinatorHandle;
use tokio_stream::wrappers::TcpListenerStream;

pub struct Coordinator {
    config: CoordinatorConfig,
    state: CoordinatorHandle,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        let state = CoordinatorHandle::new(config.replicas);
        Self { config, state }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting coordinator");
        tracing::info!("  gRPC API: {}", self.config.grpc_addr);
        tracing::info!("  HTTP API: {}", self.config.http_addr);
        tracing::info!("  Replicas: {}", self.config.replicas);

        // Create HTTP server
        let http_router = create_router(CoordState {
            state: self.state.clone(),
        });
        let http_listener = tokio::net::TcpListener::bind(self.config.http_addr).await?;
        let http_server = axum::serve(http_listener, http_router);

        // Create gRPC server on a pre-bound listener
        let grpc_listener = tokio::net::TcpListener::bind(self.config.grpc_addr).await?;
        let grpc_service = CoordGrpcService::new(self.state.clone());
        let grpc_server = tonic::transport::Server::builder()
            .add_service(grpc_service.into_server())
            .serve_with_incoming(TcpListenerStream::new(grpc_listener));

        tracing::info!("✓ Coordinator ready");

        tokio::select! {
            res = http_server => {
                if let Err(e) = res {
                    tracing::error!("HTTP server error: {}", e);
                }
            }
            res = grpc_server => {
                if let Err(e) = res {
                    tracing::error!("gRPC server error: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down coordinator");
            }
        }

        Ok(())
    }
}
