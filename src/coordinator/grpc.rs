//! Coordinator gRPC service
//!
//! Control plane for storage nodes (registration) and clients (placement
//! and lookup). Every call is a short critical section on the shared state.

use crate::coordinator::state::CoordinatorHandle;
use crate::proto::manager_service_server::{ManagerService, ManagerServiceServer};
use crate::proto::*;
use tonic::{Request, Response, Status};

/// CoordGrpcService implements the `ManagerService` RPCs.
pub struct CoordGrpcService {
    state: CoordinatorHandle,
}

impl CoordGrpcService {
    pub fn new(state: CoordinatorHandle) -> Self {
        Self { state }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> ManagerServiceServer<Self> {
        ManagerServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl ManagerService for CoordGrpcService {
    async fn register_node(
        &self,
        req: Request<RegisterNodeRequest>,
    ) -> Result<Response<RegisterNodeResponse>, Status> {
        let req = req.into_inner();
        let message = self
            .state
            .register_node(&req.node_address)
            .map_err(|e| e.to_grpc_status())?;

        Ok(Response::new(RegisterNodeResponse { message }))
    }

    async fn get_nodes_for_chunks(
        &self,
        req: Request<GetNodesForChunksRequest>,
    ) -> Result<Response<GetNodesForChunksResponse>, Status> {
        let req = req.into_inner();
        let placed = self
            .state
            .get_nodes_for_chunks(&req.file_id, req.total_chunks, &req.file_type, req.chunk_size)
            .map_err(|e| {
                tracing::warn!(file_id = %req.file_id, "Placement failed: {}", e);
                e.to_grpc_status()
            })?;

        let nodes = placed
            .into_iter()
            .map(|(chunk_id, node_address)| ChunkNodeInfo {
                chunk_id: chunk_id as i32,
                node_address,
            })
            .collect();

        Ok(Response::new(GetNodesForChunksResponse { nodes }))
    }

    async fn get_chunk_locations(
        &self,
        req: Request<GetChunkLocationsRequest>,
    ) -> Result<Response<GetChunkLocationsResponse>, Status> {
        let req = req.into_inner();
        let locations = self
            .state
            .get_chunk_locations(&req.file_id)
            .map_err(|e| e.to_grpc_status())?;

        let chunks = locations
            .chunks
            .into_iter()
            .map(|a| ChunkLocationInfo {
                chunk_id: a.chunk_id as i32,
                nodes: a.replicas,
            })
            .collect();

        Ok(Response::new(GetChunkLocationsResponse {
            chunks,
            file_type: locations.file_type,
            chunk_size: locations.chunk_size.unwrap_or(0),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(nodes: &[&str]) -> CoordGrpcService {
        let state = CoordinatorHandle::new(2);
        for node in nodes {
            state.register_node(node).unwrap();
        }
        CoordGrpcService::new(state)
    }

    #[tokio::test]
    async fn test_register_node_rpc() {
        let service = service_with(&[]);
        let resp = service
            .register_node(Request::new(RegisterNodeRequest {
                node_address: "127.0.0.1:7000".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(resp.message, "Node registered successfully");
    }

    #[tokio::test]
    async fn test_placement_and_lookup_rpc() {
        let service = service_with(&["A", "B"]);

        let resp = service
            .get_nodes_for_chunks(Request::new(GetNodesForChunksRequest {
                file_id: "f1".into(),
                total_chunks: 3,
                file_type: "txt".into(),
                chunk_size: 1024,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(resp.nodes.len(), 6);
        assert_eq!(resp.nodes[2].chunk_id, 1);
        assert_eq!(resp.nodes[2].node_address, "B");

        let resp = service
            .get_chunk_locations(Request::new(GetChunkLocationsRequest {
                file_id: "f1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(resp.file_type, "txt");
        assert_eq!(resp.chunk_size, 1024);
        let ids: Vec<i32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(resp.chunks[2].nodes, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_error_codes() {
        let service = service_with(&[]);

        let status = service
            .get_nodes_for_chunks(Request::new(GetNodesForChunksRequest {
                file_id: "f3".into(),
                total_chunks: 1,
                file_type: "txt".into(),
                chunk_size: 0,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status = service
            .get_chunk_locations(Request::new(GetChunkLocationsRequest {
                file_id: "missing".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }
}
