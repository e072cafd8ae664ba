//! Coordinator implementation
//!
//! The coordinator is responsible for:
//! - Storage node membership (registration order is placement order)
//! - Placement decisions (round-robin replicas per chunk)
//! - Chunk map and file type bookkeeping
//!
//! All state is in memory and guarded by one lock.

pub mod grpc;
pub mod http;
pub mod metadata;
pub mod placement;
pub mod registry;
pub mod server;
pub mod state;

pub use metadata::{ChunkAssignment, FileRecord};
pub use server::Coordinator;
pub use state::{CoordinatorHandle, FileLocations};
