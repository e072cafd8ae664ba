//! Client side of the transfer protocol
//!
//! - `coord_client`: placement and lookup RPCs against the coordinator
//! - `transport`: raw chunk bytes to and from storage nodes
//! - `writer` / `reader`: chunked upload and fault-tolerant download

pub mod coord_client;
pub mod reader;
pub mod transport;
pub mod writer;

pub use coord_client::{CoordClient, CoordinatorApi};
pub use reader::ChunkReader;
pub use transport::{ChunkTransport, HttpTransport};
pub use writer::{ChunkWriter, UploadSummary};

use crate::common::{ClientConfig, Result};
use crate::coordinator::FileLocations;
use std::path::{Path, PathBuf};

/// Networked client built from a `ClientConfig`
pub struct Client {
    coordinator: CoordClient,
    transport: HttpTransport,
    config: ClientConfig,
}

impl Client {
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let coordinator = CoordClient::connect(&config.coordinator, config.rpc_timeout()).await?;
        let transport = HttpTransport::new(config.http_timeout())?;
        Ok(Self {
            coordinator,
            transport,
            config,
        })
    }

    pub async fn upload(&self, path: &Path, file_id: &str) -> Result<UploadSummary> {
        ChunkWriter::new(self.coordinator.clone(), self.transport.clone())
            .upload(path, file_id, self.config.chunk_size)
            .await
    }

    pub async fn download(&self, file_id: &str) -> Result<PathBuf> {
        ChunkReader::new(
            self.coordinator.clone(),
            self.transport.clone(),
            &self.config.output_dir,
        )
        .download(file_id, self.config.chunk_size)
        .await
    }

    pub async fn locate(&self, file_id: &str) -> Result<FileLocations> {
        self.coordinator.get_chunk_locations(file_id).await
    }
}
