//! Error types
//!
//! The flip core itself never fails; these cover configuration, input
//! parsing and the server surface.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FlipError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed sample line {line:?}")]
    MalformedSample { line: String },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlipError>;
