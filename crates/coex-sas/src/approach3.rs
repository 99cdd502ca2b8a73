//! Potential-neighbor clustering ("Approach 3").
//!
//! Instead of coloring, every device estimates how many coexistence groups
//! it has to share bandwidth with at a given threshold. Effective edges
//! (weight above the threshold) join groups into the device's cluster; the
//! remaining nonzero edges to other groups are kept as potential neighbors,
//! the residual interference a device still has to tolerate.

use std::collections::{BTreeMap, BTreeSet};

use coex_ir::{DeviceId, DeviceRegistry, EdgeWeightTable, InterferenceGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{SasError, SasResult};

/// Clustering estimate for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEstimate {
    /// Distinct coexistence groups among the device and its effective neighbors.
    pub cluster_size: usize,
    /// Devices of other groups linked by a nonzero edge at or below the threshold.
    pub potential_neighbors: BTreeSet<DeviceId>,
}

/// Estimate clusters for `device_ids` at `threshold`.
///
/// Only edges with both ends in `device_ids` are considered.
#[instrument(skip_all, fields(devices = device_ids.len(), threshold = threshold))]
pub fn estimate(
    device_ids: &BTreeSet<DeviceId>,
    registry: &DeviceRegistry,
    table: &EdgeWeightTable,
    threshold: f64,
) -> SasResult<BTreeMap<DeviceId, ClusterEstimate>> {
    let mut groups: BTreeMap<&DeviceId, u32> = BTreeMap::new();
    for id in device_ids {
        let group = registry.coex_group(id).ok_or_else(|| {
            SasError::InconsistentState(format!("device '{id}' is not in the registry"))
        })?;
        groups.insert(id, group);
    }

    let effective = InterferenceGraph::induced(table, device_ids, threshold);

    let mut potential: BTreeMap<&DeviceId, BTreeSet<DeviceId>> = BTreeMap::new();
    for (key, weight) in table.iter() {
        if weight > threshold {
            continue;
        }
        let (a, b) = (key.first(), key.second());
        if let (Some(ga), Some(gb)) = (groups.get(a), groups.get(b)) {
            if ga != gb {
                potential.entry(a).or_default().insert(b.clone());
                potential.entry(b).or_default().insert(a.clone());
            }
        }
    }

    let ids: Vec<&DeviceId> = device_ids.iter().collect();
    let estimates: Vec<(DeviceId, ClusterEstimate)> = ids
        .par_iter()
        .map(|&id| {
            let mut cluster: BTreeSet<u32> = BTreeSet::from([groups[id]]);
            cluster.extend(effective.neighbors(id).filter_map(|n| groups.get(n).copied()));
            let estimate = ClusterEstimate {
                cluster_size: cluster.len(),
                potential_neighbors: potential.get(id).cloned().unwrap_or_default(),
            };
            (id.clone(), estimate)
        })
        .collect();

    info!(
        "Estimated clusters for {} devices over {} effective edges",
        estimates.len(),
        effective.edge_count()
    );
    Ok(estimates.into_iter().collect())
}

/// Estimate clusters for every device of the registry.
pub fn estimate_all(
    registry: &DeviceRegistry,
    table: &EdgeWeightTable,
    threshold: f64,
) -> SasResult<BTreeMap<DeviceId, ClusterEstimate>> {
    estimate(&registry.ids(), registry, table, threshold)
}
