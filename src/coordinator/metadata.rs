//! Chunk map store
//!
//! Stores, per file id:
//! - the file type tag
//! - the chunk size the uploader reported (if any)
//! - chunk index → ordered replica addresses
//!
//! Everything lives in memory for the lifetime of the coordinator process.

use std::collections::{BTreeMap, HashMap};

/// Replica targets for one chunk of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAssignment {
    pub chunk_id: u32,
    /// Tried in this order on read, all written on upload
    pub replicas: Vec<String>,
}

/// File record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecord {
    pub file_type: String,
    /// Chunk size reported at placement time; `None` when unreported
    pub chunk_size: Option<u64>,
    pub chunks: BTreeMap<u32, Vec<String>>,
}

impl FileRecord {
    /// Chunk assignments ordered by chunk index
    pub fn assignments(&self) -> Vec<ChunkAssignment> {
        self.chunks
            .iter()
            .map(|(chunk_id, replicas)| ChunkAssignment {
                chunk_id: *chunk_id,
                replicas: replicas.clone(),
            })
            .collect()
    }
}

/// Chunk map store
#[derive(Debug, Default)]
pub struct ChunkMapStore {
    files: HashMap<String, FileRecord>,
}

impl ChunkMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge assignments into the record for `file_id`, creating it if needed.
    ///
    /// Existing chunk indices not mentioned in `assignments` are kept; a
    /// colliding index takes the new replica list.
    pub fn record(&mut self, file_id: &str, assignments: &[ChunkAssignment]) {
        let record = self.files.entry(file_id.to_string()).or_default();
        for assignment in assignments {
            record
                .chunks
                .insert(assignment.chunk_id, assignment.replicas.clone());
        }
    }

    /// Set the file type tag (last writer wins)
    pub fn set_file_type(&mut self, file_id: &str, file_type: &str) {
        self.files.entry(file_id.to_string()).or_default().file_type = file_type.to_string();
    }

    /// Set the reported chunk size; `0` leaves a previously recorded value alone
    pub fn set_chunk_size(&mut self, file_id: &str, chunk_size: u64) {
        let record = self.files.entry(file_id.to_string()).or_default();
        if chunk_size > 0 {
            record.chunk_size = Some(chunk_size);
        }
    }

    pub fn get(&self, file_id: &str) -> Option<&FileRecord> {
        self.files.get(file_id)
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.files.contains_key(file_id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
