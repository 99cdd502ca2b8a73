//! Serialized record types for checkpoint files.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use coex_ir::{Coordination, CoverageMap, DeviceId, DeviceRegistry, GridId};
use coex_sas::ColoredComponent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coverage maps of all devices, sorted for stable output.
pub type CoverageRecord = BTreeMap<DeviceId, BTreeMap<GridId, f64>>;

/// Collect the coverage maps attached to devices.
pub fn coverage_record(registry: &DeviceRegistry) -> CoverageRecord {
    registry
        .iter()
        .filter_map(|d| {
            let map = d.coverage.as_ref()?;
            Some((d.id.clone(), map.iter().map(|(k, v)| (*k, *v)).collect()))
        })
        .collect()
}

/// Convert one stored coverage map back to its in-memory form.
pub fn coverage_map(cells: &BTreeMap<GridId, f64>) -> CoverageMap {
    cells.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Coloring result of one component as stored in `.gc` files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoringRecord {
    /// Threshold the component was colored at.
    pub threshold: f64,
    /// Color of each member.
    pub colors: BTreeMap<DeviceId, u32>,
    /// Colors used.
    pub chromatic: usize,
    /// Escalation level.
    #[serde(default)]
    pub level: u32,
    /// Whether the component fit into the channels.
    pub satisfied: bool,
}

impl ColoringRecord {
    /// Record a colored component.
    pub fn from_component(component: &ColoredComponent, max_colors: usize) -> Self {
        Self {
            threshold: component.threshold,
            colors: component.colors.clone(),
            chromatic: component.chromatic,
            level: component.level,
            satisfied: component.is_satisfied(max_colors),
        }
    }

    /// Rebuild the colored component.
    pub fn to_component(&self) -> ColoredComponent {
        ColoredComponent {
            threshold: self.threshold,
            colors: self.colors.clone(),
            chromatic: self.chromatic,
            level: self.level,
        }
    }
}

/// Summary of a run, written next to its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Unique run identifier.
    pub id: Uuid,
    /// File prefix of the run.
    pub prefix: String,
    /// Propagation model of the edge table, if built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Coordination mode of the edge table, if built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordination: Option<Coordination>,
    /// Number of devices.
    pub device_count: usize,
    /// Number of stored edges.
    #[serde(default)]
    pub edge_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl RunManifest {
    /// Create a manifest for `device_count` devices.
    pub fn new(prefix: impl Into<String>, device_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            prefix: prefix.into(),
            model: None,
            coordination: None,
            device_count,
            edge_count: 0,
            created_at: Utc::now(),
        }
    }
}
