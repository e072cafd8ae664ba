//! Chunk payload transfer against storage nodes

use crate::common::{with_http_scheme, Result};
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

/// Store and fetch raw chunk bytes on a storage node
#[tonic::async_trait]
pub trait ChunkTransport: Send + Sync {
    async fn put_chunk(&self, node: &str, file_id: &str, chunk_id: u32, data: Bytes)
        -> Result<()>;

    async fn get_chunk(&self, node: &str, file_id: &str, chunk_id: u32) -> Result<Bytes>;
}

/// HTTP transport speaking the storage node's `/upload` and `/download` API
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// `timeout` bounds each request end to end
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[tonic::async_trait]
impl ChunkTransport for HttpTransport {
    async fn put_chunk(
        &self,
        node: &str,
        file_id: &str,
        chunk_id: u32,
        data: Bytes,
    ) -> Result<()> {
        let chunk_id = chunk_id.to_string();
        let resp = self
            .client
            .post(format!("{}/upload", with_http_scheme(node)))
            .query(&[("file_id", file_id), ("chunk_id", chunk_id.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(crate::Error::Http(format!("{}: {}", status, body.trim())));
        }
        Ok(())
    }

    async fn get_chunk(&self, node: &str, file_id: &str, chunk_id: u32) -> Result<Bytes> {
        let chunk = chunk_id.to_string();
        let resp = self
            .client
            .get(format!("{}/download", with_http_scheme(node)))
            .query(&[("file_id", file_id), ("chunk_id", chunk.as_str())])
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(resp.bytes().await?),
            StatusCode::NOT_FOUND => Err(crate::Error::ChunkNotFound {
                file_id: file_id.to_string(),
                chunk: chunk_id,
            }),
            status => Err(crate::Error::Http(status.to_string())),
        }
    }
}
