//! Coordinator state
//!
//! The node registry, the placement manager and the chunk map are owned by
//! one `CoordinatorState` and only reached through `CoordinatorHandle`,
//! which holds a single mutex for the duration of each operation. Nothing
//! awaits while the lock is held.

use crate::common::{validate_file_id, Result};
use crate::coordinator::metadata::{ChunkAssignment, ChunkMapStore};
use crate::coordinator::placement::PlacementManager;
use crate::coordinator::registry::NodeRegistry;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Reply text for a successful registration
pub const REGISTERED_MESSAGE: &str = "Node registered successfully";

/// Chunk map of one file as returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocations {
    pub chunks: Vec<ChunkAssignment>,
    pub file_type: String,
    pub chunk_size: Option<u64>,
}

/// Snapshot for the admin status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStatus {
    pub nodes: Vec<String>,
    pub files: usize,
    pub replicas: usize,
}

pub struct CoordinatorState {
    registry: NodeRegistry,
    placement: PlacementManager,
    chunks: ChunkMapStore,
}

impl CoordinatorState {
    pub fn new(replicas: usize) -> Self {
        Self {
            registry: NodeRegistry::new(),
            placement: PlacementManager::new(replicas),
            chunks: ChunkMapStore::new(),
        }
    }

    pub fn register_node(&mut self, address: &str) -> Result<String> {
        let address = address.trim();
        if address.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "node address cannot be empty".into(),
            ));
        }

        if self.registry.register(address) {
            tracing::info!(node = %address, total = self.registry.len(), "Node registered");
        } else {
            tracing::debug!(node = %address, "Node already registered");
        }
        Ok(REGISTERED_MESSAGE.to_string())
    }

    /// Place chunks `0..total_chunks` of `file_id` and record the result.
    ///
    /// Returns one `(chunk, node)` pair per replica.
    pub fn get_nodes_for_chunks(
        &mut self,
        file_id: &str,
        total_chunks: i32,
        file_type: &str,
        chunk_size: u64,
    ) -> Result<Vec<(u32, String)>> {
        validate_file_id(file_id)?;
        let total_chunks = u32::try_from(total_chunks).map_err(|_| {
            crate::Error::InvalidArgument(format!("negative chunk count: {}", total_chunks))
        })?;

        let nodes = self.registry.snapshot();
        let assignments = self
            .placement
            .place(file_id, &nodes, total_chunks, &mut self.chunks)?;
        self.chunks.set_file_type(file_id, file_type);
        self.chunks.set_chunk_size(file_id, chunk_size);

        tracing::info!(
            file_id = %file_id,
            chunks = total_chunks,
            nodes = nodes.len(),
            "Placed file"
        );

        Ok(assignments
            .into_iter()
            .flat_map(|a| {
                let chunk_id = a.chunk_id;
                a.replicas.into_iter().map(move |node| (chunk_id, node))
            })
            .collect())
    }

    pub fn get_chunk_locations(&self, file_id: &str) -> Result<FileLocations> {
        let record = self
            .chunks
            .get(file_id)
            .ok_or_else(|| crate::Error::FileNotFound(file_id.to_string()))?;

        Ok(FileLocations {
            chunks: record.assignments(),
            file_type: record.file_type.clone(),
            chunk_size: record.chunk_size,
        })
    }

    pub fn status(&self) -> ClusterStatus {
        ClusterStatus {
            nodes: self.registry.snapshot(),
            files: self.chunks.len(),
            replicas: self.placement.replicas(),
        }
    }
}

/// Shared, lock-guarded access to the coordinator state
#[derive(Clone)]
pub struct CoordinatorHandle {
    inner: Arc<Mutex<CoordinatorState>>,
}

impl CoordinatorHandle {
    pub fn new(replicas: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CoordinatorState::new(replicas))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CoordinatorState>> {
        self.inner
            .lock()
            .map_err(|_| crate::Error::Internal("coordinator state lock poisoned".into()))
    }

    pub fn register_node(&self, address: &str) -> Result<String> {
        self.lock()?.register_node(address)
    }

    pub fn get_nodes_for_chunks(
        &self,
        file_id: &str,
        total_chunks: i32,
        file_type: &str,
        chunk_size: u64,
    ) -> Result<Vec<(u32, String)>> {
        self.lock()?
            .get_nodes_for_chunks(file_id, total_chunks, file_type, chunk_size)
    }

    pub fn get_chunk_locations(&self, file_id: &str) -> Result<FileLocations> {
        self.lock()?.get_chunk_locations(file_id)
    }

    pub fn status(&self) -> Result<ClusterStatus> {
        Ok(self.lock()?.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(u32, &str)]) -> Vec<(u32, String)> {
        raw.iter().map(|(c, n)| (*c, n.to_string())).collect()
    }

    #[test]
    fn test_two_node_scenario() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();
        handle.register_node("B").unwrap();

        let placed = handle.get_nodes_for_chunks("f1", 3, "txt", 0).unwrap();
        assert_eq!(
            placed,
            pairs(&[(0, "A"), (0, "B"), (1, "B"), (1, "A"), (2, "A"), (2, "B")])
        );

        let locations = handle.get_chunk_locations("f1").unwrap();
        assert_eq!(locations.file_type, "txt");
        assert_eq!(locations.chunks.len(), 3);
        assert_eq!(locations.chunks[1].replicas, vec!["B", "A"]);
        assert_eq!(locations.chunk_size, None);
    }

    #[test]
    fn test_single_node_scenario() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();

        let placed = handle.get_nodes_for_chunks("f2", 2, "bin", 0).unwrap();
        assert_eq!(placed, pairs(&[(0, "A"), (1, "A")]));
    }

    #[test]
    fn test_empty_registry_records_nothing() {
        let handle = CoordinatorHandle::new(2);
        let result = handle.get_nodes_for_chunks("f3", 1, "txt", 0);
        assert!(matches!(result, Err(crate::Error::NoNodesAvailable)));
        assert!(matches!(
            handle.get_chunk_locations("f3"),
            Err(crate::Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_file() {
        let handle = CoordinatorHandle::new(2);
        match handle.get_chunk_locations("nope") {
            Err(crate::Error::FileNotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_register_twice_keeps_one_entry() {
        let handle = CoordinatorHandle::new(2);
        assert_eq!(handle.register_node("A").unwrap(), REGISTERED_MESSAGE);
        assert_eq!(handle.register_node("A").unwrap(), REGISTERED_MESSAGE);
        assert_eq!(handle.status().unwrap().nodes, vec!["A"]);
    }

    #[test]
    fn test_replacement_extends_chunk_range() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();
        handle.get_nodes_for_chunks("f1", 2, "txt", 0).unwrap();

        handle.register_node("B").unwrap();
        handle.get_nodes_for_chunks("f1", 4, "log", 0).unwrap();

        let locations = handle.get_chunk_locations("f1").unwrap();
        assert_eq!(locations.chunks.len(), 4);
        assert_eq!(locations.chunks[0].replicas, vec!["A", "B"]);
        assert_eq!(locations.chunks[3].replicas, vec!["B", "A"]);
        assert_eq!(locations.file_type, "log");
    }

    #[test]
    fn test_zero_chunks_creates_empty_record() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();

        assert!(handle.get_nodes_for_chunks("empty", 0, "", 0).unwrap().is_empty());
        let locations = handle.get_chunk_locations("empty").unwrap();
        assert!(locations.chunks.is_empty());
    }

    #[test]
    fn test_invalid_requests() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();

        assert!(matches!(
            handle.get_nodes_for_chunks("f1", -1, "txt", 0),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert!(matches!(
            handle.get_nodes_for_chunks("", 1, "txt", 0),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert!(handle.register_node("  ").is_err());
    }

    #[test]
    fn test_chunk_size_recorded() {
        let handle = CoordinatorHandle::new(2);
        handle.register_node("A").unwrap();
        handle.get_nodes_for_chunks("f1", 1, "txt", 4096).unwrap();
        assert_eq!(
            handle.get_chunk_locations("f1").unwrap().chunk_size,
            Some(4096)
        );
    }
}
