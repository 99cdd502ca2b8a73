//! Error types for the propagation crate.

use coex_ir::{DeviceId, IrError, Location};
use thiserror::Error;

/// Errors that can occur while computing signals, coverage or edge weights.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropError {
    /// No model is known under this name.
    #[error("Unknown propagation model: {0}")]
    UnknownModel(String),

    /// The model is known but no implementation was registered for it.
    #[error("Propagation model not available: {0}")]
    ModelUnavailable(String),

    /// Invalid builder or model parameter.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model could not compute a path loss.
    #[error("Propagation from '{tx}' to {rx} failed: {reason}")]
    Propagation {
        /// Transmitting device.
        tx: DeviceId,
        /// Receiver location.
        rx: Location,
        /// Why the computation failed.
        reason: String,
    },

    /// Edge weight of a pair could not be computed.
    #[error("Edge weight for ({first}, {second}) failed: {source}")]
    PairFailed {
        /// Lower id of the pair.
        first: DeviceId,
        /// Higher id of the pair.
        second: DeviceId,
        /// Underlying failure.
        #[source]
        source: Box<PropError>,
    },

    /// Area coordination needs a coverage map that is missing.
    #[error("Device '{0}' has no coverage map")]
    MissingCoverage(DeviceId),

    /// Registry or table error.
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl PropError {
    /// Whether the error stems from configuration rather than computation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PropError::UnknownModel(_) | PropError::ModelUnavailable(_) | PropError::Configuration(_)
        )
    }
}

/// Result type for propagation operations.
pub type PropResult<T> = Result<T, PropError>;
