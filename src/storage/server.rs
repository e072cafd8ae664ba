//! Storage node server

use crate::client::CoordClient;
use crate::common::{NodeConfig, Result};
use crate::storage::http::{create_router, NodeState};
use crate::storage::store::{ChunkStore, DiskChunkStore, MemoryChunkStore};
use std::sync::Arc;

pub struct StorageServer {
    config: NodeConfig,
}

impl StorageServer {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    fn open_store(&self) -> Result<Arc<dyn ChunkStore>> {
        Ok(match &self.config.data_dir {
            Some(dir) => Arc::new(DiskChunkStore::open(dir)?),
            None => Arc::new(MemoryChunkStore::new()),
        })
    }

    /// Bind, register with the coordinator, then serve chunk traffic.
    ///
    /// A failed registration aborts startup.
    pub async fn serve(self) -> Result<()> {
        let store = self.open_store()?;

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        let advertised = self
            .config
            .advertise_addr
            .clone()
            .unwrap_or_else(|| local_addr.to_string());

        tracing::info!("Starting storage node");
        tracing::info!("  Listening on: {}", local_addr);
        tracing::info!("  Advertised as: {}", advertised);
        tracing::info!("  Coordinator: {}", self.config.coordinator);
        match &self.config.data_dir {
            Some(dir) => tracing::info!("  Data directory: {}", dir.display()),
            None => tracing::info!("  Data directory: none (in-memory)"),
        }

        let coordinator =
            CoordClient::connect(&self.config.coordinator, self.config.rpc_timeout()).await?;
        let message = coordinator.register_node(&advertised).await?;
        tracing::info!("Registered with coordinator: {}", message);

        let router = create_router(NodeState { store }, self.config.max_chunk_size);

        tracing::info!("✓ Storage node ready");

        tokio::select! {
            res = axum::serve(listener, router) => {
                if let Err(e) = res {
                    tracing::error!("HTTP server error: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down storage node");
            }
        }

        Ok(())
    }
}
