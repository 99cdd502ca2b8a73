//! Evaluation metrics for assignments and clustering estimates.

use std::collections::BTreeMap;

use coex_ir::{DeviceId, DeviceRegistry};
use coex_prop::PropagationModel;
use serde::{Deserialize, Serialize};

use crate::approach3::ClusterEstimate;
use crate::coloring::ColoredComponent;
use crate::error::{SasError, SasResult};

/// Fraction of devices holding each channel.
pub fn channel_utilization(registry: &DeviceRegistry, channels: &[u32]) -> BTreeMap<u32, f64> {
    let total = registry.len().max(1) as f64;
    channels
        .iter()
        .map(|&ch| {
            let holders = registry.iter().filter(|d| d.channels.contains(&ch)).count();
            (ch, holders as f64 / total)
        })
        .collect()
}

/// Bandwidth of one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceBandwidth {
    /// Bandwidth of the assigned channels, in MHz.
    pub actual_mhz: f64,
    /// Total bandwidth divided by the component's chromatic number, in MHz.
    pub theoretical_mhz: f64,
}

/// Per-device bandwidth with averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandwidthReport {
    /// Bandwidth per device.
    pub devices: BTreeMap<DeviceId, DeviceBandwidth>,
    /// Mean assigned bandwidth, in MHz.
    pub mean_actual_mhz: f64,
    /// Mean theoretical bandwidth, in MHz.
    pub mean_theoretical_mhz: f64,
}

/// Compare assigned bandwidth against the even share of each component.
pub fn bandwidth_report(
    registry: &DeviceRegistry,
    components: &[ColoredComponent],
    num_channels: usize,
    channel_bw_mhz: f64,
) -> SasResult<BandwidthReport> {
    let total = num_channels as f64 * channel_bw_mhz;
    let mut devices = BTreeMap::new();

    for component in components {
        let share = if component.chromatic == 0 {
            0.0
        } else {
            total / component.chromatic as f64
        };
        for id in component.colors.keys() {
            let device = registry.get(id).ok_or_else(|| {
                SasError::InconsistentState(format!("colored device '{id}' is not in the registry"))
            })?;
            devices.insert(
                id.clone(),
                DeviceBandwidth {
                    actual_mhz: device.channels.len() as f64 * channel_bw_mhz,
                    theoretical_mhz: share,
                },
            );
        }
    }

    let n = devices.len().max(1) as f64;
    let mean_actual_mhz = devices.values().map(|b| b.actual_mhz).sum::<f64>() / n;
    let mean_theoretical_mhz = devices.values().map(|b| b.theoretical_mhz).sum::<f64>() / n;

    Ok(BandwidthReport {
        devices,
        mean_actual_mhz,
        mean_theoretical_mhz,
    })
}

/// Upper bound on bandwidth per device when sharing evenly within its cluster.
pub fn approach3_bandwidth(
    estimates: &BTreeMap<DeviceId, ClusterEstimate>,
    total_bw_mhz: f64,
) -> BTreeMap<DeviceId, f64> {
    estimates
        .iter()
        .map(|(id, e)| (id.clone(), total_bw_mhz / e.cluster_size.max(1) as f64))
        .collect()
}

/// Power average of dBm values over `units`: `10·log10(Σ 10^(x/10) / units)`.
///
/// Returns negative infinity for no values.
pub fn aggregate_dbm(values: impl IntoIterator<Item = f64>, units: f64) -> f64 {
    let linear: f64 = values.into_iter().map(|x| 10f64.powf(x / 10.0)).sum();
    if linear <= 0.0 || units <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * (linear / units).log10()
}

/// Aggregate signal each device receives from its potential neighbors, in dBm.
pub fn residual_interference(
    model: &dyn PropagationModel,
    registry: &DeviceRegistry,
    estimates: &BTreeMap<DeviceId, ClusterEstimate>,
) -> SasResult<BTreeMap<DeviceId, f64>> {
    let mut residual = BTreeMap::new();
    for (id, estimate) in estimates {
        let rx = registry.require(id, "residual interference")?;
        let mut signals = Vec::with_capacity(estimate.potential_neighbors.len());
        for neighbor in &estimate.potential_neighbors {
            let tx = registry.require(neighbor, "residual interference")?;
            signals.push(model.received_signal(tx, rx.location, rx.height)?);
        }
        residual.insert(id.clone(), aggregate_dbm(signals, 1.0));
    }
    Ok(residual)
}
