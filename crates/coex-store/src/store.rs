//! Checkpoint store trait.

use async_trait::async_trait;
use coex_ir::{DeviceRegistry, EdgeWeightTable};
use coex_prop::AreaGrid;

use crate::error::StoreResult;
use crate::records::{ColoringRecord, CoverageRecord, RunManifest};

/// Extension of the device records.
pub const DEVICES_EXT: &str = "cbsd";
/// Extension of the edge-weight table.
pub const EDGES_EXT: &str = "ewt";
/// Extension of the coverage maps.
pub const COVERAGE_EXT: &str = "cvg";
/// Extension of the area grid.
pub const AREA_EXT: &str = "area";
/// Extension of the coloring results.
pub const COLORING_EXT: &str = "gc";
/// Extension of the run manifest.
pub const MANIFEST_EXT: &str = "manifest.json";

/// Every record extension of a run.
pub const ALL_EXTS: [&str; 6] = [
    DEVICES_EXT,
    EDGES_EXT,
    COVERAGE_EXT,
    AREA_EXT,
    COLORING_EXT,
    MANIFEST_EXT,
];

/// Persistent storage for the records of a run.
///
/// Records are addressed by a run prefix and stored independently, so a run
/// can be resumed from any completed phase. Loading a record that was never
/// saved returns `Ok(None)`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save the device records.
    async fn save_devices(&self, prefix: &str, registry: &DeviceRegistry) -> StoreResult<()>;

    /// Load the device records.
    async fn load_devices(&self, prefix: &str) -> StoreResult<Option<DeviceRegistry>>;

    /// Save the edge-weight table together with its model tag.
    async fn save_edges(&self, prefix: &str, table: &EdgeWeightTable) -> StoreResult<()>;

    /// Load the edge-weight table.
    async fn load_edges(&self, prefix: &str) -> StoreResult<Option<EdgeWeightTable>>;

    /// Save coverage maps.
    async fn save_coverage(&self, prefix: &str, coverage: &CoverageRecord) -> StoreResult<()>;

    /// Load coverage maps.
    async fn load_coverage(&self, prefix: &str) -> StoreResult<Option<CoverageRecord>>;

    /// Save the area grid.
    async fn save_area(&self, prefix: &str, grid: &AreaGrid) -> StoreResult<()>;

    /// Load the area grid.
    async fn load_area(&self, prefix: &str) -> StoreResult<Option<AreaGrid>>;

    /// Save coloring results.
    async fn save_coloring(&self, prefix: &str, records: &[ColoringRecord]) -> StoreResult<()>;

    /// Load coloring results.
    async fn load_coloring(&self, prefix: &str) -> StoreResult<Option<Vec<ColoringRecord>>>;

    /// Save the run manifest.
    async fn save_manifest(&self, manifest: &RunManifest) -> StoreResult<()>;

    /// Load the run manifest.
    async fn load_manifest(&self, prefix: &str) -> StoreResult<Option<RunManifest>>;

    /// Whether any record of the run exists.
    async fn exists(&self, prefix: &str) -> StoreResult<bool>;

    /// Prefixes of all runs with a manifest, sorted.
    async fn list_runs(&self) -> StoreResult<Vec<String>>;

    /// Delete one record of a run. Returns whether it existed.
    async fn delete_record(&self, prefix: &str, ext: &str) -> StoreResult<bool>;

    /// Delete every record of a run. Returns the number of files removed.
    async fn delete_run(&self, prefix: &str) -> StoreResult<usize> {
        let mut removed = 0;
        for ext in ALL_EXTS {
            if self.delete_record(prefix, ext).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// `prefix` itself if unused, otherwise the first unused `prefix-N`.
    async fn next_free_prefix(&self, prefix: &str) -> StoreResult<String> {
        if !self.exists(prefix).await? {
            return Ok(prefix.to_string());
        }
        let mut n = 1_u32;
        loop {
            let candidate = format!("{prefix}-{n}");
            if !self.exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}
