//! Error handling for checkpoint persistence.

use std::path::PathBuf;

use coex_ir::IrError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while saving or loading checkpoints.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// A required record of a run is missing.
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    /// Run prefix that cannot name a file in the store directory.
    #[error("Invalid run prefix: '{0}'")]
    InvalidPrefix(String),

    /// Malformed edge-weight file.
    #[error("Malformed edge table {path:?} at line {line}: {reason}")]
    Format {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Records of one run disagree about which devices exist.
    #[error("Inconsistent checkpoint: {0}")]
    Inconsistent(String),

    /// Invalid device or table data.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
