//! Error types for shardfs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Placement Errors ===
    #[error("No registered nodes available")]
    NoNodesAvailable,

    // === Metadata Errors ===
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Chunk size mismatch: recorded {recorded}, requested {requested}")]
    ChunkSizeMismatch { recorded: u64, requested: u64 },

    // === Transfer Errors ===
    #[error("Chunk {0} unavailable on every replica")]
    ChunkUnavailable(u32),

    #[error("Write of chunk {chunk} to {node} failed: {reason}")]
    ReplicaWriteFailed {
        chunk: u32,
        node: String,
        reason: String,
    },

    #[error("Chunk {chunk} of file {file_id} not stored on this node")]
    ChunkNotFound { file_id: String, chunk: u32 },

    // === Network Errors ===
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Operation timeout: {0}")]
    Timeout(String),

    // === Input / Config Errors ===
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert to gRPC status for RPC responses
    pub fn to_grpc_status(&self) -> tonic::Status {
        use tonic::Code;
        match self {
            Error::NoNodesAvailable => {
                tonic::Status::new(Code::FailedPrecondition, self.to_string())
            }
            Error::FileNotFound(_) | Error::ChunkNotFound { .. } => {
                tonic::Status::new(Code::NotFound, self.to_string())
            }
            Error::InvalidArgument(_) | Error::ChunkSizeMismatch { .. } => {
                tonic::Status::new(Code::InvalidArgument, self.to_string())
            }
            Error::Timeout(_) => tonic::Status::new(Code::DeadlineExceeded, self.to_string()),
            Error::Grpc(status) => status.clone(),
            _ => tonic::Status::new(Code::Internal, self.to_string()),
        }
    }

    /// Recover the error kind from a status returned by the coordinator.
    ///
    /// `file_id` is the identifier the failed request was about; it fills in
    /// `FileNotFound` since the status only carries free text.
    pub fn from_grpc_status(status: tonic::Status, file_id: &str) -> Self {
        use tonic::Code;
        match status.code() {
            Code::FailedPrecondition => Error::NoNodesAvailable,
            Code::NotFound => Error::FileNotFound(file_id.to_string()),
            Code::InvalidArgument => Error::InvalidArgument(status.message().to_string()),
            Code::DeadlineExceeded => Error::Timeout(status.message().to_string()),
            _ => Error::Grpc(status),
        }
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Error::FileNotFound(_) | Error::ChunkNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidArgument(_) | Error::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            Error::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Error::NoNodesAvailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(e: tonic::transport::Error) -> Self {
        Error::ConnectionFailed(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_connect() {
            Error::ConnectionFailed(e.to_string())
        } else {
            Error::Http(e.to_string())
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
