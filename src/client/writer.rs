//! Chunked upload
//!
//! The placement plan is fetched once, from the chunk count alone, before
//! any byte moves. Each chunk is then pushed to every replica in its plan;
//! the first failed replica write aborts the upload. Chunks already written
//! stay where they are.

use crate::client::coord_client::CoordinatorApi;
use crate::client::transport::ChunkTransport;
use crate::common::{chunk_count, file_type_of, format_bytes, Result};
use bytes::Bytes;
use futures_util::future::try_join_all;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Outcome of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_id: String,
    pub total_chunks: u32,
    pub bytes: u64,
    /// Acknowledged replica writes across all chunks
    pub replica_writes: usize,
}

pub struct ChunkWriter<C, T> {
    coordinator: C,
    transport: T,
}

impl<C: CoordinatorApi, T: ChunkTransport> ChunkWriter<C, T> {
    pub fn new(coordinator: C, transport: T) -> Self {
        Self {
            coordinator,
            transport,
        }
    }

    pub async fn upload(
        &self,
        path: &Path,
        file_id: &str,
        chunk_size: u64,
    ) -> Result<UploadSummary> {
        if chunk_size == 0 {
            return Err(crate::Error::InvalidArgument(
                "chunk size must be positive".into(),
            ));
        }

        let mut file = tokio::fs::File::open(path).await?;
        let file_size = file.metadata().await?.len();
        let total_chunks = u32::try_from(chunk_count(file_size, chunk_size)).map_err(|_| {
            crate::Error::InvalidArgument(format!(
                "{} is too large for chunk size {}",
                path.display(),
                chunk_size
            ))
        })?;
        let file_type = file_type_of(path);

        let plan = self
            .coordinator
            .get_nodes_for_chunks(file_id, total_chunks, &file_type, chunk_size)
            .await?;
        let plan = group_by_chunk(plan);

        tracing::info!(
            file_id = %file_id,
            size = %format_bytes(file_size),
            chunks = total_chunks,
            "Uploading file"
        );

        let mut replica_writes = 0;
        for chunk_id in 0..total_chunks {
            let mut buf = Vec::with_capacity(chunk_size.min(file_size) as usize);
            (&mut file).take(chunk_size).read_to_end(&mut buf).await?;
            if buf.is_empty() {
                return Err(crate::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("{} shrank during upload", path.display()),
                )));
            }

            let replicas = plan.get(&chunk_id).ok_or_else(|| {
                crate::Error::Internal(format!("no replicas planned for chunk {}", chunk_id))
            })?;

            self.push_chunk(file_id, chunk_id, Bytes::from(buf), replicas)
                .await?;
            replica_writes += replicas.len();
        }

        tracing::info!(file_id = %file_id, "Upload complete");

        Ok(UploadSummary {
            file_id: file_id.to_string(),
            total_chunks,
            bytes: file_size,
            replica_writes,
        })
    }

    /// Write one chunk to all of its replicas; replica writes run concurrently.
    async fn push_chunk(
        &self,
        file_id: &str,
        chunk_id: u32,
        data: Bytes,
        replicas: &[String],
    ) -> Result<()> {
        let writes = replicas.iter().map(|node| {
            let data = data.clone();
            async move {
                self.transport
                    .put_chunk(node, file_id, chunk_id, data)
                    .await
                    .map_err(|e| crate::Error::ReplicaWriteFailed {
                        chunk: chunk_id,
                        node: node.clone(),
                        reason: e.to_string(),
                    })?;
                tracing::debug!(chunk_id, node = %node, "Chunk uploaded");
                Ok::<_, crate::Error>(())
            }
        });

        try_join_all(writes).await?;
        Ok(())
    }
}

/// Regroup the flat `(chunk, node)` plan, keeping replica order per chunk.
fn group_by_chunk(plan: Vec<(u32, String)>) -> BTreeMap<u32, Vec<String>> {
    let mut grouped: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (chunk_id, node) in plan {
        let replicas = grouped.entry(chunk_id).or_default();
        if !replicas.contains(&node) {
            replicas.push(node);
        }
    }
    grouped
}
