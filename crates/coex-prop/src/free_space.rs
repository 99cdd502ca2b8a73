//! Free-space path loss.

use coex_ir::{Device, Location};

use crate::error::{PropError, PropResult};
use crate::geo::distance_km;
use crate::model::{ModelConfig, PropagationModel};

/// Distances below this are evaluated at this value, in kilometers.
const MIN_DISTANCE_KM: f64 = 0.001;

/// Friis free-space model: `20·log10(d_km · f_MHz) + 32.44`.
///
/// Antenna heights and terrain are ignored.
#[derive(Debug, Clone)]
pub struct FreeSpaceModel {
    frequency_mhz: f64,
}

impl FreeSpaceModel {
    /// Registry name.
    pub const NAME: &'static str = "freespace";

    /// Create a model for a carrier frequency.
    pub fn new(frequency_mhz: f64) -> PropResult<Self> {
        if !(frequency_mhz.is_finite() && frequency_mhz > 0.0) {
            return Err(PropError::Configuration(format!(
                "frequency must be positive, got {frequency_mhz} MHz"
            )));
        }
        Ok(Self { frequency_mhz })
    }

    /// Create a model from a factory configuration.
    pub fn from_config(config: &ModelConfig) -> PropResult<Self> {
        Self::new(config.frequency_mhz)
    }

    /// Carrier frequency in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_mhz
    }

    /// Loss over a distance in kilometers.
    pub fn loss_at(&self, distance_km: f64) -> f64 {
        20.0 * (distance_km.max(MIN_DISTANCE_KM) * self.frequency_mhz).log10() + 32.44
    }

    /// Distance in kilometers at which the loss reaches `loss_db`.
    pub fn range_for_loss(&self, loss_db: f64) -> f64 {
        10f64.powf((loss_db - 32.44) / 20.0) / self.frequency_mhz
    }
}

impl PropagationModel for FreeSpaceModel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn path_loss(&self, tx: &Device, rx: Location, _rx_height: f64) -> PropResult<f64> {
        Ok(self.loss_at(distance_km(tx.location, rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coex_ir::Category;

    #[test]
    fn test_loss_at_one_km() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        let expected = 20.0 * 3550f64.log10() + 32.44;
        assert!((model.loss_at(1.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_loss_grows_with_distance() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        assert!(model.loss_at(2.0) > model.loss_at(1.0));
        assert!((model.loss_at(2.0) - model.loss_at(1.0) - 20.0 * 2f64.log10()).abs() < 1e-9);
        assert_eq!(model.loss_at(0.0), model.loss_at(MIN_DISTANCE_KM));
    }

    #[test]
    fn test_range_inverts_loss() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        let loss = model.loss_at(3.2);
        assert!((model.range_for_loss(loss) - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_received_signal_uses_tx_power() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        let mut tx = Device::new("1", Location::new(36.0, -76.0), 6.0, Category::B, 47.0);
        let rx = Location::new(36.01, -76.0);

        let full = model.received_signal(&tx, rx, 0.0).unwrap();
        tx.set_power(37.0);
        let reduced = model.received_signal(&tx, rx, 0.0).unwrap();
        assert!((full - reduced - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_frequency() {
        assert!(FreeSpaceModel::new(0.0).is_err());
        assert!(FreeSpaceModel::new(f64::NAN).is_err());
    }
}
