//! Coverage maps over an area grid.

use std::collections::BTreeMap;

use coex_ir::{CoverageMap, Device, DeviceId, DeviceRegistry, GridId};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{info, instrument};

use crate::error::PropResult;
use crate::grid::AreaGrid;
use crate::model::PropagationModel;

/// Receiver antenna height used for coverage cells, in meters.
pub const COVERAGE_RX_HEIGHT_M: f64 = 0.0;

/// Signal of `device` in every cell of `grid` where it reaches `rx_min` dBm.
pub fn compute_coverage(
    model: &dyn PropagationModel,
    device: &Device,
    grid: &AreaGrid,
    rx_min: f64,
) -> PropResult<CoverageMap> {
    let mut map = CoverageMap::default();
    for (&id, &location) in &grid.cells {
        let signal = model.received_signal(device, location, COVERAGE_RX_HEIGHT_M)?;
        if signal >= rx_min {
            map.insert(id, signal);
        }
    }
    Ok(map)
}

/// Coverage of every device, computed in parallel.
///
/// Fails on the first device whose coverage cannot be computed.
#[instrument(skip(model, registry, grid), fields(model = model.name(), cells = grid.len()))]
pub fn compute_all_coverage(
    model: &dyn PropagationModel,
    registry: &DeviceRegistry,
    grid: &AreaGrid,
    rx_min: f64,
) -> PropResult<BTreeMap<DeviceId, CoverageMap>> {
    let devices: Vec<&Device> = registry.iter().collect();
    let maps = devices
        .par_iter()
        .map(|device| -> PropResult<(DeviceId, CoverageMap)> {
            Ok((device.id.clone(), compute_coverage(model, device, grid, rx_min)?))
        })
        .collect::<PropResult<Vec<_>>>()?;

    info!("Computed coverage for {} devices", maps.len());
    Ok(maps.into_iter().collect())
}

/// Compute coverage for all devices and store it on the devices.
pub fn prepare_coverage(
    model: &dyn PropagationModel,
    registry: &mut DeviceRegistry,
    grid: &AreaGrid,
    rx_min: f64,
) -> PropResult<()> {
    let maps = compute_all_coverage(model, registry, grid, rx_min)?;
    for (id, map) in maps {
        if let Some(device) = registry.get_mut(&id) {
            device.coverage = Some(map);
        }
    }
    Ok(())
}

/// Cells of a coverage map at or above `rx_min`.
pub fn effective_cells(map: &CoverageMap, rx_min: f64) -> FxHashSet<GridId> {
    map.iter()
        .filter(|(_, signal)| **signal >= rx_min)
        .map(|(id, _)| *id)
        .collect()
}

/// Fraction of the smaller effective coverage shared with the other one.
///
/// Zero when either coverage or their overlap is empty.
pub fn overlap_ratio(a: &CoverageMap, b: &CoverageMap, rx_min: f64) -> f64 {
    let cells_a = effective_cells(a, rx_min);
    let cells_b = effective_cells(b, rx_min);
    let smaller = cells_a.len().min(cells_b.len());
    if smaller == 0 {
        return 0.0;
    }
    let overlap = cells_a.intersection(&cells_b).count();
    overlap as f64 / smaller as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free_space::FreeSpaceModel;
    use crate::grid::Area;
    use coex_ir::{Category, Location};

    fn map(cells: &[(GridId, f64)]) -> CoverageMap {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_overlap_uses_smaller_area() {
        let a = map(&[(1, -50.0), (2, -60.0), (3, -70.0), (4, -80.0)]);
        let b = map(&[(3, -50.0), (4, -60.0)]);
        assert_eq!(overlap_ratio(&a, &b, -96.0), 1.0);
        assert_eq!(overlap_ratio(&b, &a, -96.0), 1.0);
    }

    #[test]
    fn test_overlap_respects_threshold() {
        let a = map(&[(1, -50.0), (2, -100.0)]);
        let b = map(&[(2, -50.0), (3, -50.0)]);
        assert_eq!(overlap_ratio(&a, &b, -96.0), 0.0);
        assert_eq!(overlap_ratio(&a, &b, -110.0), 0.5);
    }

    #[test]
    fn test_overlap_empty() {
        assert_eq!(overlap_ratio(&CoverageMap::default(), &map(&[(1, 0.0)]), -96.0), 0.0);
    }

    #[test]
    fn test_coverage_keeps_strong_cells() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        let center = Location::new(36.846849, -76.000229);
        let grid = AreaGrid::new(Area::new(center, 2.0, 2.0), 0.5).unwrap();
        let device = Device::new("1", center, 6.0, Category::A, 26.0);

        let all = compute_coverage(&model, &device, &grid, f64::NEG_INFINITY).unwrap();
        assert_eq!(all.len(), grid.len());

        let strong = compute_coverage(&model, &device, &grid, -72.0).unwrap();
        assert!(strong.len() < all.len());
        assert!(!strong.is_empty());
        assert!(strong.values().all(|s| *s >= -72.0));
    }

    #[test]
    fn test_prepare_coverage_sets_maps() {
        let model = FreeSpaceModel::new(3550.0).unwrap();
        let center = Location::new(36.846849, -76.000229);
        let grid = AreaGrid::new(Area::new(center, 1.0, 1.0), 0.5).unwrap();
        let mut registry = DeviceRegistry::from_devices([
            Device::new("1", center, 6.0, Category::A, 26.0),
            Device::new("2", center, 6.0, Category::A, 26.0),
        ])
        .unwrap();

        prepare_coverage(&model, &mut registry, &grid, -96.0).unwrap();
        assert!(registry.has_coverage());
    }
}
