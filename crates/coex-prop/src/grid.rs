//! Rectangular study area tiled with square cells.

use std::collections::BTreeMap;

use coex_ir::{GridId, Location};
use serde::{Deserialize, Serialize};

use crate::error::{PropError, PropResult};
use crate::geo::{distance_km, offset};

/// Study area centred on a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Centre of the area.
    pub center: Location,
    /// East-west extent in kilometers.
    pub width_km: f64,
    /// North-south extent in kilometers.
    pub length_km: f64,
}

impl Area {
    /// Create an area.
    pub fn new(center: Location, width_km: f64, length_km: f64) -> Self {
        Self {
            center,
            width_km,
            length_km,
        }
    }

    /// Surface in square kilometers.
    pub fn surface_km2(&self) -> f64 {
        self.width_km * self.length_km
    }

    /// Smallest area holding all `locations`, widened by `margin_km` on every
    /// side. `None` without locations.
    pub fn enclosing(
        locations: impl IntoIterator<Item = Location>,
        margin_km: f64,
    ) -> Option<Self> {
        let mut locations = locations.into_iter();
        let first = locations.next()?;
        let (mut south, mut north, mut west, mut east) = (first.lat, first.lat, first.lon, first.lon);
        for l in locations {
            south = south.min(l.lat);
            north = north.max(l.lat);
            west = west.min(l.lon);
            east = east.max(l.lon);
        }

        let center = Location::new((south + north) / 2.0, (west + east) / 2.0);
        let width_km = distance_km(
            Location::new(center.lat, west),
            Location::new(center.lat, east),
        );
        let length_km = distance_km(
            Location::new(south, center.lon),
            Location::new(north, center.lon),
        );
        Some(Self::new(
            center,
            width_km + 2.0 * margin_km,
            length_km + 2.0 * margin_km,
        ))
    }
}

/// Cell centres of an [`Area`], keyed by cell id.
///
/// Ids start at 1 and run column by column: west to east, and south to
/// north within each column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaGrid {
    /// The tiled area.
    pub area: Area,
    /// Cell edge length in kilometers.
    pub grid_size_km: f64,
    /// Cell centres.
    pub cells: BTreeMap<GridId, Location>,
}

impl AreaGrid {
    /// Tile `area` with cells of `grid_size_km`.
    pub fn new(area: Area, grid_size_km: f64) -> PropResult<Self> {
        if !(grid_size_km.is_finite() && grid_size_km > 0.0) {
            return Err(PropError::Configuration(format!(
                "grid size must be positive, got {grid_size_km} km"
            )));
        }
        if !(area.width_km > 0.0 && area.length_km > 0.0) {
            return Err(PropError::Configuration(format!(
                "area must have positive extent, got {} x {} km",
                area.width_km, area.length_km
            )));
        }

        let columns = cells_along(area.width_km, grid_size_km);
        let rows = cells_along(area.length_km, grid_size_km);
        let x0 = (grid_size_km - area.width_km) / 2.0;
        let y0 = (grid_size_km - area.length_km) / 2.0;

        let mut cells = BTreeMap::new();
        let mut id: GridId = 1;
        for i in 0..columns {
            let x = x0 + i as f64 * grid_size_km;
            for j in 0..rows {
                let y = y0 + j as f64 * grid_size_km;
                cells.insert(id, offset(area.center, x, y));
                id += 1;
            }
        }

        Ok(Self {
            area,
            grid_size_km,
            cells,
        })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Centre of a cell.
    pub fn cell(&self, id: GridId) -> Option<Location> {
        self.cells.get(&id).copied()
    }

    /// Surface of one cell in square kilometers.
    pub fn cell_area_km2(&self) -> f64 {
        self.grid_size_km * self.grid_size_km
    }
}

/// Number of cell centres in `[(-extent + size)/2, (extent + size)/2)` stepped by `size`.
fn cells_along(extent: f64, size: f64) -> usize {
    ((extent / size) - 1e-9).ceil().max(1.0) as usize
}
