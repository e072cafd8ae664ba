//! Chunked download
//!
//! Each chunk is fetched from the first replica (in listed order) that
//! returns it and written at `chunk_id * chunk_size` in the output file, so
//! chunk order does not matter. A chunk with no reachable replica fails the
//! whole download.

use crate::client::coord_client::CoordinatorApi;
use crate::client::transport::ChunkTransport;
use crate::common::Result;
use crate::coordinator::ChunkAssignment;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// `output.<file type>`, or `output` when the type is unknown
pub fn output_file_name(file_type: &str) -> String {
    if file_type.is_empty() {
        "output".to_string()
    } else {
        format!("output.{}", file_type)
    }
}

pub struct ChunkReader<C, T> {
    coordinator: C,
    transport: T,
    output_dir: PathBuf,
}

impl<C: CoordinatorApi, T: ChunkTransport> ChunkReader<C, T> {
    pub fn new(coordinator: C, transport: T, output_dir: impl AsRef<Path>) -> Self {
        Self {
            coordinator,
            transport,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Rebuild `file_id` and return the path it was written to.
    ///
    /// `chunk_size` must be the value used for the upload.
    pub async fn download(&self, file_id: &str, chunk_size: u64) -> Result<PathBuf> {
        if chunk_size == 0 {
            return Err(crate::Error::InvalidArgument(
                "chunk size must be positive".into(),
            ));
        }

        let locations = self.coordinator.get_chunk_locations(file_id).await?;
        if let Some(recorded) = locations.chunk_size {
            if recorded != chunk_size {
                return Err(crate::Error::ChunkSizeMismatch {
                    recorded,
                    requested: chunk_size,
                });
            }
        }

        let output = self.output_dir.join(output_file_name(&locations.file_type));
        let mut out = tokio::fs::File::create(&output).await?;

        for chunk in &locations.chunks {
            let data = self.fetch_chunk(file_id, chunk).await?;

            let offset = u64::from(chunk.chunk_id)
                .checked_mul(chunk_size)
                .ok_or_else(|| {
                    crate::Error::InvalidArgument(format!(
                        "chunk {} offset overflows with chunk size {}",
                        chunk.chunk_id, chunk_size
                    ))
                })?;
            out.seek(SeekFrom::Start(offset)).await?;
            out.write_all(&data).await?;

            tracing::debug!(chunk_id = chunk.chunk_id, offset, "Chunk written");
        }
        out.flush().await?;

        tracing::info!(
            file_id = %file_id,
            chunks = locations.chunks.len(),
            output = %output.display(),
            "Download complete"
        );
        Ok(output)
    }

    async fn fetch_chunk(&self, file_id: &str, chunk: &ChunkAssignment) -> Result<Bytes> {
        for node in &chunk.replicas {
            match self.transport.get_chunk(node, file_id, chunk.chunk_id).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    tracing::warn!(
                        chunk_id = chunk.chunk_id,
                        node = %node,
                        "Replica failed, trying next: {}",
                        e
                    );
                }
            }
        }
        Err(crate::Error::ChunkUnavailable(chunk.chunk_id))
    }
}
