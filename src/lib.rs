//! # shardfs
//!
//! A minimal distributed file store:
//! - A coordinator tracks storage nodes and decides, per file, which nodes
//!   hold which chunk replicas
//! - Storage nodes keep raw chunk bytes and serve them over HTTP
//! - Clients split files into chunks, ask the coordinator where chunks go
//!   (or live), and move the bytes directly to and from storage nodes
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────┐
//!            │         Coordinator          │
//!            │  registry · placement · map  │
//!            └──────┬───────────────▲───────┘
//!      RegisterNode │ gRPC     gRPC │ GetNodesForChunks
//!                   │               │ GetChunkLocations
//!   ┌───────────────▼──┐        ┌───┴──────────┐
//!   │  Storage nodes   │◄──────►│    Client    │
//!   │  /upload         │  HTTP  │ writer/reader│
//!   │  /download       │        └──────────────┘
//!   └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start a coordinator
//! ```bash
//! shardfs-coord serve --grpc 0.0.0.0:50051 --http 0.0.0.0:50080
//! ```
//!
//! ### Start storage nodes
//! ```bash
//! shardfs-node serve --bind 127.0.0.1:7001 --coordinator http://127.0.0.1:50051 --data ./node-1
//! shardfs-node serve --bind 127.0.0.1:7002 --coordinator http://127.0.0.1:50051
//! ```
//!
//! ### Use the CLI
//! ```bash
//! shardfs upload ./report.txt --chunk-size 1048576
//! shardfs locate report
//! shardfs download report --chunk-size 1048576 --output-dir ./restored
//! ```

#![allow(clippy::result_large_err)]

pub mod client;
pub mod common;
pub mod coordinator;
pub mod storage;

// Re-export commonly used types
pub use client::Client;
pub use common::{Config, Error, Result};
pub use coordinator::Coordinator;
pub use storage::StorageServer;

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("shardfs");
}

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
