//! Error types for scenario generation.

use coex_ir::IrError;
use thiserror::Error;

/// Errors that can occur while loading scenario settings or generating devices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScenarioError {
    /// Missing, unknown or out-of-range setting.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generated devices could not be registered.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;
