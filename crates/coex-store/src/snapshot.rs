//! Whole-run save and load with consistency checks.

use std::collections::BTreeSet;

use coex_ir::{Coordination, DeviceId, DeviceRegistry, EdgeWeightTable, IrError};
use coex_prop::AreaGrid;
use tracing::{debug, info, instrument};

use crate::error::{StoreError, StoreResult};
use crate::records::{ColoringRecord, CoverageRecord, RunManifest, coverage_map, coverage_record};
use crate::store::{AREA_EXT, COLORING_EXT, COVERAGE_EXT, CheckpointStore, EDGES_EXT};

/// All records of one run.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    /// Run summary, if one was written.
    pub manifest: Option<RunManifest>,
    /// Device records. Coverage maps are kept in `coverage`.
    pub devices: DeviceRegistry,
    /// Edge-weight table.
    pub edges: Option<EdgeWeightTable>,
    /// Coverage maps.
    pub coverage: Option<CoverageRecord>,
    /// Area grid.
    pub area: Option<AreaGrid>,
    /// Coloring results.
    pub coloring: Option<Vec<ColoringRecord>>,
}

impl RunSnapshot {
    /// Snapshot holding only devices. Coverage maps attached to the devices
    /// are copied into the coverage record.
    pub fn new(devices: DeviceRegistry) -> Self {
        let coverage = Some(coverage_record(&devices)).filter(|c| !c.is_empty());
        Self {
            manifest: None,
            devices,
            edges: None,
            coverage,
            area: None,
            coloring: None,
        }
    }

    /// Check that all records refer to the same set of devices.
    ///
    /// Edge, coverage and coloring ids must be known devices. With an
    /// area-coordinated table and stored coverage, every device must have a
    /// coverage map.
    pub fn verify(&self) -> StoreResult<()> {
        let ids = self.devices.ids();

        if let Some(edges) = &self.edges {
            edges.check_against(&self.devices).map_err(|e| match e {
                IrError::UnknownDevice { .. } => {
                    StoreError::Inconsistent(format!("edge table: {e}"))
                }
                other => StoreError::Ir(other),
            })?;
        }

        if let Some(coverage) = &self.coverage {
            check_subset("coverage maps", coverage.keys(), &ids)?;
            let area_mode = self
                .edges
                .as_ref()
                .is_some_and(|t| t.coordination() == Coordination::Area);
            if area_mode {
                if let Some(missing) = ids.iter().find(|id| !coverage.contains_key(*id)) {
                    return Err(StoreError::Inconsistent(format!(
                        "device '{missing}' has no coverage map for area coordination"
                    )));
                }
            }
        }

        if let Some(coloring) = &self.coloring {
            let mut colored = BTreeSet::new();
            for record in coloring {
                for id in record.colors.keys() {
                    if !colored.insert(id) {
                        return Err(StoreError::Inconsistent(format!(
                            "device '{id}' appears in more than one coloring component"
                        )));
                    }
                }
            }
            check_subset("coloring results", colored.into_iter(), &ids)?;
        }

        if let Some(manifest) = &self.manifest {
            if manifest.device_count != ids.len() {
                return Err(StoreError::Inconsistent(format!(
                    "manifest lists {} devices, records hold {}",
                    manifest.device_count,
                    ids.len()
                )));
            }
        }

        Ok(())
    }

    /// Attach stored coverage maps to the devices.
    pub fn attach_coverage(&mut self) {
        let Some(coverage) = &self.coverage else {
            return;
        };
        for device in self.devices.iter_mut() {
            if let Some(cells) = coverage.get(&device.id) {
                device.coverage = Some(coverage_map(cells));
            }
        }
    }
}

fn check_subset<'a>(
    what: &str,
    mut found: impl Iterator<Item = &'a DeviceId>,
    ids: &BTreeSet<DeviceId>,
) -> StoreResult<()> {
    match found.find(|id| !ids.contains(*id)) {
        Some(id) => Err(StoreError::Inconsistent(format!(
            "{what} reference unknown device '{id}'"
        ))),
        None => Ok(()),
    }
}

/// Write every present record of `snapshot` under `prefix`, followed by a
/// manifest.
///
/// Records missing from the snapshot are deleted, so the stored run always
/// matches the snapshot as a whole.
#[instrument(skip(store, snapshot))]
pub async fn save_run(
    store: &dyn CheckpointStore,
    prefix: &str,
    snapshot: &RunSnapshot,
) -> StoreResult<RunManifest> {
    snapshot.verify()?;

    store.save_devices(prefix, &snapshot.devices).await?;
    match &snapshot.edges {
        Some(edges) => store.save_edges(prefix, edges).await?,
        None => drop_stale(store, prefix, EDGES_EXT).await?,
    }
    match &snapshot.coverage {
        Some(coverage) => store.save_coverage(prefix, coverage).await?,
        None => drop_stale(store, prefix, COVERAGE_EXT).await?,
    }
    match &snapshot.area {
        Some(area) => store.save_area(prefix, area).await?,
        None => drop_stale(store, prefix, AREA_EXT).await?,
    }
    match &snapshot.coloring {
        Some(coloring) => store.save_coloring(prefix, coloring).await?,
        None => drop_stale(store, prefix, COLORING_EXT).await?,
    }

    let mut manifest = RunManifest::new(prefix, snapshot.devices.len());
    if let Some(edges) = &snapshot.edges {
        manifest.model = Some(edges.model().to_string());
        manifest.coordination = Some(edges.coordination());
        manifest.edge_count = edges.len();
    }
    store.save_manifest(&manifest).await?;

    info!("Saved run '{}' with {} devices", prefix, manifest.device_count);
    Ok(manifest)
}

async fn drop_stale(store: &dyn CheckpointStore, prefix: &str, ext: &str) -> StoreResult<()> {
    if store.delete_record(prefix, ext).await? {
        debug!("Removed stale {} record of run '{}'", ext, prefix);
    }
    Ok(())
}

/// Load every record of the run at `prefix` and verify them together.
///
/// Device records are required; all other records are optional.
#[instrument(skip(store))]
pub async fn load_run(store: &dyn CheckpointStore, prefix: &str) -> StoreResult<RunSnapshot> {
    let devices = store
        .load_devices(prefix)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("no device records for run '{prefix}'")))?;

    let mut snapshot = RunSnapshot {
        manifest: store.load_manifest(prefix).await?,
        devices,
        edges: store.load_edges(prefix).await?,
        coverage: store.load_coverage(prefix).await?,
        area: store.load_area(prefix).await?,
        coloring: store.load_coloring(prefix).await?,
    };
    snapshot.verify()?;
    snapshot.attach_coverage();

    info!(
        "Loaded run '{}': {} devices, edges {}, coverage {}, coloring {}",
        prefix,
        snapshot.devices.len(),
        snapshot.edges.is_some(),
        snapshot.coverage.is_some(),
        snapshot.coloring.is_some()
    );
    Ok(snapshot)
}
