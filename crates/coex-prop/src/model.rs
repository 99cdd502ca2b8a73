//! Propagation model abstraction.
//!
//! A model turns the geometry and RF parameters of a transmitter and a
//! receiver location into a path loss. Models must be deterministic: the
//! same inputs always give the same loss, so edge-weight tables can be
//! rebuilt and compared.

use coex_ir::{Device, Location};
use serde::{Deserialize, Serialize};

use crate::error::PropResult;

/// Lowest frequency of the shared band, in MHz.
pub const BAND_LOW_MHZ: f64 = 3550.0;

/// Highest frequency of the shared band, in MHz.
pub const BAND_HIGH_MHZ: f64 = 3700.0;

/// Parameters passed to a model factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name the model is registered under.
    pub name: String,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Additional model-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelConfig {
    /// Create a configuration at the lower band edge.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frequency_mhz: BAND_LOW_MHZ,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the carrier frequency.
    pub fn with_frequency(mut self, frequency_mhz: f64) -> Self {
        self.frequency_mhz = frequency_mhz;
        self
    }

    /// Add a model-specific setting.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A radio propagation model.
pub trait PropagationModel: Send + Sync {
    /// Name the model is registered under; also used to tag edge tables.
    fn name(&self) -> &str;

    /// Path loss in dB from `tx` to a receiver at `rx` with antenna height `rx_height`.
    fn path_loss(&self, tx: &Device, rx: Location, rx_height: f64) -> PropResult<f64>;

    /// Received signal in dBm at `rx`, given the transmitter's current power.
    fn received_signal(&self, tx: &Device, rx: Location, rx_height: f64) -> PropResult<f64> {
        Ok(tx.tx_power() - self.path_loss(tx, rx, rx_height)?)
    }
}
