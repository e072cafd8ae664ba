//! gRPC client for the coordinator
//!
//! Every call carries the configured deadline; an expired deadline surfaces
//! as `Error::Timeout` or a transport error like any other failure.

use crate::common::{with_http_scheme, Result};
use crate::coordinator::{ChunkAssignment, CoordinatorHandle, FileLocations};
use crate::proto::manager_service_client::ManagerServiceClient;
use crate::proto::*;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// Placement and lookup calls the transfer protocol needs from a coordinator
#[tonic::async_trait]
pub trait CoordinatorApi: Send + Sync {
    /// One `(chunk, node)` pair per replica
    async fn get_nodes_for_chunks(
        &self,
        file_id: &str,
        total_chunks: u32,
        file_type: &str,
        chunk_size: u64,
    ) -> Result<Vec<(u32, String)>>;

    async fn get_chunk_locations(&self, file_id: &str) -> Result<FileLocations>;
}

#[derive(Clone)]
pub struct CoordClient {
    client: ManagerServiceClient<Channel>,
}

impl CoordClient {
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Endpoint::from_shared(with_http_scheme(addr))
            .map_err(|e| {
                crate::Error::InvalidConfig(format!("invalid coordinator address {}: {}", addr, e))
            })?
            .connect_timeout(timeout)
            .timeout(timeout);

        let channel = endpoint.connect().await?;
        Ok(Self {
            client: ManagerServiceClient::new(channel),
        })
    }

    pub async fn register_node(&self, node_address: &str) -> Result<String> {
        let request = tonic::Request::new(RegisterNodeRequest {
            node_address: node_address.to_string(),
        });

        let response = self
            .client
            .clone()
            .register_node(request)
            .await
            .map_err(|s| crate::Error::from_grpc_status(s, ""))?;
        Ok(response.into_inner().message)
    }
}

#[tonic::async_trait]
impl CoordinatorApi for CoordClient {
    async fn get_nodes_for_chunks(
        &self,
        file_id: &str,
        total_chunks: u32,
        file_type: &str,
        chunk_size: u64,
    ) -> Result<Vec<(u32, String)>> {
        let total_chunks = i32::try_from(total_chunks).map_err(|_| {
            crate::Error::InvalidArgument(format!("too many chunks: {}", total_chunks))
        })?;
        let request = tonic::Request::new(GetNodesForChunksRequest {
            file_id: file_id.to_string(),
            total_chunks,
            file_type: file_type.to_string(),
            chunk_size,
        });

        let response = self
            .client
            .clone()
            .get_nodes_for_chunks(request)
            .await
            .map_err(|s| crate::Error::from_grpc_status(s, file_id))?;

        response
            .into_inner()
            .nodes
            .into_iter()
            .map(|info| Ok((chunk_index(info.chunk_id)?, info.node_address)))
            .collect()
    }

    async fn get_chunk_locations(&self, file_id: &str) -> Result<FileLocations> {
        let request = tonic::Request::new(GetChunkLocationsRequest {
            file_id: file_id.to_string(),
        });

        let response = self
            .client
            .clone()
            .get_chunk_locations(request)
            .await
            .map_err(|s| crate::Error::from_grpc_status(s, file_id))?
            .into_inner();

        let chunks = response
            .chunks
            .into_iter()
            .map(|info| {
                Ok(ChunkAssignment {
                    chunk_id: chunk_index(info.chunk_id)?,
                    replicas: info.nodes,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FileLocations {
            chunks,
            file_type: response.file_type,
            chunk_size: (response.chunk_size > 0).then_some(response.chunk_size),
        })
    }
}

/// In-process coordinator, used when client and coordinator share a process
#[tonic::async_trait]
impl CoordinatorApi for CoordinatorHandle {
    async fn get_nodes_for_chunks(
        &self,
        file_id: &str,
        total_chunks: u32,
        file_type: &str,
        chunk_size: u64,
    ) -> Result<Vec<(u32, String)>> {
        let total_chunks = i32::try_from(total_chunks).map_err(|_| {
            crate::Error::InvalidArgument(format!("too many chunks: {}", total_chunks))
        })?;
        CoordinatorHandle::get_nodes_for_chunks(self, file_id, total_chunks, file_type, chunk_size)
    }

    async fn get_chunk_locations(&self, file_id: &str) -> Result<FileLocations> {
        CoordinatorHandle::get_chunk_locations(self, file_id)
    }
}

fn chunk_index(raw: i32) -> Result<u32> {
    u32::try_from(raw)
        .map_err(|_| crate::Error::Internal(format!("coordinator sent chunk id {}", raw)))
}
