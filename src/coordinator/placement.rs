//! Round-robin replica placement
//!
//! Chunk `i` goes to `N[i mod n]`, then `N[(i+1) mod n]`, ... until the
//! replica count is reached, where `N` is the registry snapshot. The result
//! depends only on the snapshot and the chunk count.

use crate::common::Result;
use crate::coordinator::metadata::{ChunkAssignment, ChunkMapStore};

/// PlacementManager computes replica targets for every chunk of a file.
pub struct PlacementManager {
    /// Number of replicas per chunk
    replicas: usize,
}

impl PlacementManager {
    pub fn new(replicas: usize) -> Self {
        Self {
            replicas: replicas.max(1),
        }
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Assign replicas for chunks `0..total_chunks` over `nodes`.
    ///
    /// Each chunk gets `min(replicas, nodes.len())` distinct addresses.
    pub fn assign(&self, nodes: &[String], total_chunks: u32) -> Result<Vec<ChunkAssignment>> {
        if nodes.is_empty() {
            return Err(crate::Error::NoNodesAvailable);
        }

        let n = nodes.len();
        let per_chunk = self.replicas.min(n);

        Ok((0..total_chunks)
            .map(|chunk_id| {
                let first = chunk_id as usize % n;
                ChunkAssignment {
                    chunk_id,
                    replicas: (0..per_chunk)
                        .map(|k| nodes[(first + k) % n].clone())
                        .collect(),
                }
            })
            .collect())
    }

    /// Assign replicas and merge them into the chunk map for `file_id`.
    pub fn place(
        &self,
        file_id: &str,
        nodes: &[String],
        total_chunks: u32,
        store: &mut ChunkMapStore,
    ) -> Result<Vec<ChunkAssignment>> {
        let assignments = self.assign(nodes, total_chunks)?;
        store.record(file_id, &assignments);
        Ok(assignments)
    }
}

impl Default for PlacementManager {
    fn default() -> Self {
        Self::new(2)
    }
}
