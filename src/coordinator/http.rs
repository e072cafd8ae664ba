//! HTTP API for the coordinator
//!
//! Read-only operational endpoints; the control plane itself is gRPC.

use crate::coordinator::state::CoordinatorHandle;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct CoordState {
    pub state: CoordinatorHandle,
}

pub fn create_router(state: CoordState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/admin/status", axum::routing::get(admin_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// Registered nodes (in placement order) and file count
async fn admin_status(State(state): State<CoordState>) -> impl IntoResponse {
    match state.state.status() {
        Ok(status) => (StatusCode::OK, Json(json!(status))),
        Err(e) => (
            e.to_http_status(),
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
