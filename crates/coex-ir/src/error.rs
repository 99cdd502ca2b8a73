//! Error types for the IR crate.

use crate::device::DeviceId;
use thiserror::Error;

/// Errors that can occur in registry and edge-table operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A device with this id is already registered.
    #[error("Device '{0}' is already registered")]
    DuplicateDevice(DeviceId),

    /// Device not found in the registry.
    #[error("Device '{id}' not found{}", format_context(.context))]
    DeviceNotFound {
        /// The id that was looked up.
        id: DeviceId,
        /// Optional description of where the lookup happened.
        context: Option<String>,
    },

    /// An edge references a device that is not part of the device set.
    #[error("Edge ({first}, {second}) references unknown device '{missing}'")]
    UnknownDevice {
        /// Lower id of the pair.
        first: DeviceId,
        /// Higher id of the pair.
        second: DeviceId,
        /// The id missing from the registry.
        missing: DeviceId,
    },

    /// An edge weight outside of (0, 1].
    #[error("Edge ({first}, {second}) has weight {weight} outside (0, 1]")]
    InvalidWeight {
        /// Lower id of the pair.
        first: DeviceId,
        /// Higher id of the pair.
        second: DeviceId,
        /// The rejected weight.
        weight: f64,
    },

    /// A self-loop was requested.
    #[error("Device '{0}' cannot interfere with itself")]
    SelfEdge(DeviceId),
}

#[allow(clippy::ref_option)]
fn format_context(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" ({ctx})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
