//! Payload HTTP API of a storage node
//!
//! - `POST /upload?file_id=..&chunk_id=..` stores the raw request body
//! - `GET /download?file_id=..&chunk_id=..` returns the stored bytes
//!
//! Chunk ids travel as decimal strings.

use crate::common::Result;
use crate::storage::store::ChunkStore;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct NodeState {
    pub store: Arc<dyn ChunkStore>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkParams {
    file_id: Option<String>,
    chunk_id: Option<String>,
}

impl ChunkParams {
    fn parse(self) -> Result<(String, u32)> {
        let (Some(file_id), Some(chunk_id)) = (self.file_id, self.chunk_id) else {
            return Err(crate::Error::InvalidArgument(
                "Missing file_id or chunk_id".into(),
            ));
        };
        if file_id.is_empty() {
            return Err(crate::Error::InvalidArgument("Empty file_id".into()));
        }
        let chunk_id = chunk_id
            .parse::<u32>()
            .map_err(|_| crate::Error::InvalidArgument(format!("Invalid chunk_id: {}", chunk_id)))?;
        Ok((file_id, chunk_id))
    }
}

pub fn create_router(state: NodeState, max_chunk_size: usize) -> Router {
    Router::new()
        .route("/upload", axum::routing::post(upload_chunk))
        .route("/download", axum::routing::get(download_chunk))
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_chunk_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(e: crate::Error) -> Response {
    (e.to_http_status(), e.to_string()).into_response()
}

async fn upload_chunk(
    State(state): State<NodeState>,
    Query(params): Query<ChunkParams>,
    body: Bytes,
) -> Response {
    let (file_id, chunk_id) = match params.parse() {
        Ok(ids) => ids,
        Err(e) => return error_response(e),
    };

    match state.store.put(&file_id, chunk_id, &body) {
        Ok(()) => {
            tracing::debug!(file_id = %file_id, chunk_id, bytes = body.len(), "Stored chunk");
            (
                StatusCode::OK,
                format!("Chunk {} of file {} stored successfully", chunk_id, file_id),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(file_id = %file_id, chunk_id, "Failed to store chunk: {}", e);
            error_response(e)
        }
    }
}

async fn download_chunk(
    State(state): State<NodeState>,
    Query(params): Query<ChunkParams>,
) -> Response {
    let (file_id, chunk_id) = match params.parse() {
        Ok(ids) => ids,
        Err(e) => return error_response(e),
    };

    match state.store.get(&file_id, chunk_id) {
        Ok(Some(data)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        Ok(None) => error_response(crate::Error::ChunkNotFound {
            file_id,
            chunk: chunk_id,
        }),
        Err(e) => error_response(e),
    }
}

async fn health(State(state): State<NodeState>) -> Response {
    match state.store.chunk_count() {
        Ok(chunks) => Json(json!({ "status": "ok", "chunks": chunks })).into_response(),
        Err(e) => error_response(e),
    }
}
