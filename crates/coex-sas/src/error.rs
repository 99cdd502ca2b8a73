//! Error types for the coloring and assignment crate.

use coex_ir::IrError;
use coex_prop::PropError;
use thiserror::Error;

/// Errors that can occur while partitioning, coloring or assigning channels.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SasError {
    /// Invalid or missing parameter, reported before any computation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inputs disagree about which devices exist.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// Registry or table error.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Propagation or edge-weight build error.
    #[error(transparent)]
    Propagation(#[from] PropError),
}

/// Result type for coloring and assignment operations.
pub type SasResult<T> = Result<T, SasError>;
