//! Edge-weight construction.
//!
//! For every unordered device pair the builder computes an interference
//! weight in [0, 1] with the configured model and coordination mode. Pairs
//! are evaluated in parallel; any failing pair aborts the whole build so that
//! a computation failure is never mistaken for "no interference".

use coex_ir::{Coordination, Device, DeviceRegistry, EdgeKey, EdgeWeightTable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::coverage::overlap_ratio;
use crate::error::{PropError, PropResult};
use crate::geo::distance_km;
use crate::model::PropagationModel;

/// Default interference range beyond which pairs never interfere, in km.
pub const DEFAULT_MAX_RANGE_KM: f64 = 40.0;
/// Default interference mapped to weight 0, in dBm.
pub const DEFAULT_I_MIN: f64 = -96.0;
/// Default interference mapped to weight 1, in dBm.
pub const DEFAULT_I_MAX: f64 = 20.0;
/// Default minimum received power for a coverage cell, in dBm.
pub const DEFAULT_RX_MIN: f64 = -96.0;

/// Parameters of an edge-weight build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeightConfig {
    /// Point or area coordination.
    pub coordination: Coordination,
    /// Pairs at or beyond this distance get weight 0.
    pub max_range_km: f64,
    /// Interference at or below this maps to 0.
    pub i_min: f64,
    /// Interference at or above this maps to 1.
    pub i_max: f64,
    /// Coverage cells below this signal are ignored.
    pub rx_min: f64,
}

impl Default for EdgeWeightConfig {
    fn default() -> Self {
        Self {
            coordination: Coordination::Point,
            max_range_km: DEFAULT_MAX_RANGE_KM,
            i_min: DEFAULT_I_MIN,
            i_max: DEFAULT_I_MAX,
            rx_min: DEFAULT_RX_MIN,
        }
    }
}

impl EdgeWeightConfig {
    /// Check the parameters.
    pub fn validate(&self) -> PropResult<()> {
        if !(self.max_range_km > 0.0) {
            return Err(PropError::Configuration(format!(
                "max_range_km must be positive, got {}",
                self.max_range_km
            )));
        }
        if !(self.i_min < self.i_max) {
            return Err(PropError::Configuration(format!(
                "i_min ({}) must be below i_max ({})",
                self.i_min, self.i_max
            )));
        }
        if self.rx_min.is_nan() {
            return Err(PropError::Configuration("rx_min must be a number".into()));
        }
        Ok(())
    }
}

/// Map an interference level linearly onto [0, 1], clamping outside the bounds.
pub fn normalize_interference(interference: f64, i_min: f64, i_max: f64) -> f64 {
    (interference.clamp(i_min, i_max) - i_min) / (i_max - i_min)
}

/// Computes edge weights with one propagation model.
pub struct EdgeWeightBuilder<'a> {
    model: &'a dyn PropagationModel,
    config: EdgeWeightConfig,
}

impl<'a> EdgeWeightBuilder<'a> {
    /// Create a builder.
    pub fn new(model: &'a dyn PropagationModel, config: EdgeWeightConfig) -> Self {
        Self { model, config }
    }

    /// The build parameters.
    pub fn config(&self) -> &EdgeWeightConfig {
        &self.config
    }

    /// Weight of one pair, in either order.
    ///
    /// Pairs out of range or sharing an exempt group are 0 without calling
    /// the model.
    pub fn edge_weight(&self, a: &Device, b: &Device) -> PropResult<f64> {
        if a.shares_exempt_group(b) {
            return Ok(0.0);
        }
        if distance_km(a.location, b.location) >= self.config.max_range_km {
            return Ok(0.0);
        }

        match self.config.coordination {
            Coordination::Point => self.point_weight(a, b),
            Coordination::Area => self.area_weight(a, b),
        }
    }

    fn point_weight(&self, a: &Device, b: &Device) -> PropResult<f64> {
        let at_a = self.model.received_signal(b, a.location, a.height)?;
        let at_b = self.model.received_signal(a, b.location, b.height)?;
        let (lo, hi) = (self.config.i_min, self.config.i_max);
        Ok(normalize_interference(at_a, lo, hi).max(normalize_interference(at_b, lo, hi)))
    }

    fn area_weight(&self, a: &Device, b: &Device) -> PropResult<f64> {
        let cov_a = a
            .coverage
            .as_ref()
            .ok_or_else(|| PropError::MissingCoverage(a.id.clone()))?;
        let cov_b = b
            .coverage
            .as_ref()
            .ok_or_else(|| PropError::MissingCoverage(b.id.clone()))?;
        Ok(overlap_ratio(cov_a, cov_b, self.config.rx_min))
    }

    /// Build the table for every pair in the registry.
    #[instrument(skip(self, registry), fields(model = self.model.name(), devices = registry.len()))]
    pub fn build(&self, registry: &DeviceRegistry) -> PropResult<EdgeWeightTable> {
        self.config.validate()?;
        if self.config.coordination == Coordination::Area {
            if let Some(device) = registry.iter().find(|d| d.coverage.is_none()) {
                return Err(PropError::MissingCoverage(device.id.clone()));
            }
        }

        let devices: Vec<&Device> = registry.iter().collect();
        let n = devices.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        debug!("Evaluating {} device pairs", pairs.len());

        let weights = pairs
            .par_iter()
            .map(|&(i, j)| -> PropResult<(usize, usize, f64)> {
                let (a, b) = (devices[i], devices[j]);
                let weight = self.edge_weight(a, b).map_err(|e| PropError::PairFailed {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    source: Box::new(e),
                })?;
                Ok((i, j, weight))
            })
            .collect::<PropResult<Vec<_>>>()?;

        let mut table = EdgeWeightTable::new(self.model.name(), self.config.coordination);
        for (i, j, weight) in weights {
            if weight > 0.0 {
                let key = EdgeKey::new(devices[i].id.clone(), devices[j].id.clone())?;
                table.insert(key, weight.min(1.0))?;
            }
        }

        info!(
            "Built {} edges over {} pairs ({} coordination)",
            table.len(),
            pairs.len(),
            self.config.coordination
        );
        Ok(table)
    }
}
