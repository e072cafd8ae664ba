//! Common utilities and types shared across shardfs

pub mod config;
pub mod error;
pub mod utils;

pub use config::{ClientConfig, Config, CoordinatorConfig, NodeConfig};
pub use error::{Error, Result};
pub use utils::{
    chunk_count, encode_key, file_id_of, file_type_of, format_bytes, parse_duration,
    validate_file_id, with_http_scheme,
};
