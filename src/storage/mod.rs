//! Storage node implementation
//!
//! Holds raw chunk bytes keyed by `(file_id, chunk_id)` and serves them over
//! HTTP. Placement is decided elsewhere; a node only registers its address
//! with the coordinator at startup.

pub mod http;
pub mod server;
pub mod store;

pub use server::StorageServer;
pub use store::{ChunkStore, DiskChunkStore, MemoryChunkStore};
