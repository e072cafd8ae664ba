//! Configuration for shardfs components
//!
//! Values come from an optional `shardfs.toml` and `SHARDFS_*` environment
//! variables (`SHARDFS_CLIENT__CHUNK_SIZE=4096`). Binaries override them with
//! their command-line flags.

use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "shardfs.toml";

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub client: ClientConfig,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load `shardfs.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(env_source())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coordinator.replicas == 0 {
            return Err(crate::Error::InvalidConfig(
                "coordinator.replicas must be at least 1".into(),
            ));
        }
        if self.client.chunk_size == 0 {
            return Err(crate::Error::InvalidConfig(
                "client.chunk_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// `SHARDFS_<SECTION>__<FIELD>` environment variables
fn env_source() -> ::config::Environment {
    ::config::Environment::with_prefix("SHARDFS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Bind address for the gRPC control plane
    #[serde(default = "default_grpc_addr")]
    pub grpc_addr: SocketAddr,

    /// Bind address for health/status HTTP endpoints
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Replicas per chunk (capped by the number of registered nodes)
    #[serde(default = "default_replicas")]
    pub replicas: usize,
}

fn default_grpc_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50051))
}
fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50080))
}
fn default_replicas() -> usize {
    2
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            grpc_addr: default_grpc_addr(),
            http_addr: default_http_addr(),
            replicas: default_replicas(),
        }
    }
}

/// Storage node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Bind address for the payload HTTP listener (port 0 picks a free port)
    #[serde(default = "default_node_bind")]
    pub bind_addr: SocketAddr,

    /// Address reported to the coordinator; defaults to the bound address
    #[serde(default)]
    pub advertise_addr: Option<String>,

    /// Coordinator gRPC endpoint
    #[serde(default = "default_coordinator")]
    pub coordinator: String,

    /// Chunk directory; chunks are kept in memory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Largest accepted chunk body
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,
}

fn default_node_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}
fn default_coordinator() -> String {
    "http://127.0.0.1:50051".to_string()
}
fn default_max_chunk_size() -> usize {
    64 * 1024 * 1024
}
fn default_rpc_timeout() -> u64 {
    5_000
}

impl NodeConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_node_bind(),
            advertise_addr: None,
            coordinator: default_coordinator(),
            data_dir: None,
            max_chunk_size: default_max_chunk_size(),
            rpc_timeout_ms: default_rpc_timeout(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Coordinator gRPC endpoint
    #[serde(default = "default_coordinator")]
    pub coordinator: String,

    /// Chunk size in bytes; must match between upload and download
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Deadline for each coordinator RPC
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,

    /// Deadline for each chunk transfer
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    /// Directory downloads are reconstructed into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_chunk_size() -> u64 {
    1024 * 1024
}
fn default_http_timeout() -> u64 {
    10_000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ClientConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator(),
            chunk_size: default_chunk_size(),
            rpc_timeout_ms: default_rpc_timeout(),
            http_timeout_ms: default_http_timeout(),
            output_dir: default_output_dir(),
        }
    }
}
