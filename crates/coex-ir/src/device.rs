//! Device (CBSD) types.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Unique identifier for a device within a run.
///
/// Ids are compared lexicographically; every ordered traversal in the
/// workspace (pairs, partitions, greedy tie-breaks) follows this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Borrow the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        DeviceId(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        DeviceId(id)
    }
}

impl From<usize> for DeviceId {
    fn from(id: usize) -> Self {
        DeviceId(id.to_string())
    }
}

/// Identifier of a cell in an area grid.
pub type GridId = u32;

/// Received signal per grid cell, in dBm.
pub type CoverageMap = FxHashMap<GridId, f64>;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Location {
    /// Create a new location.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Regulatory device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Category A: low power, typically indoor.
    #[serde(rename = "cata")]
    A,
    /// Category B: high power, outdoor.
    #[serde(rename = "catb")]
    B,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::A => write!(f, "cata"),
            Category::B => write!(f, "catb"),
        }
    }
}

/// Region classification of a device location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegionType {
    /// Urban, including dense urban.
    Urban,
    /// Suburban.
    Suburban,
    /// Rural, and anything not classified otherwise.
    Rural,
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionType::Urban => write!(f, "URBAN"),
            RegionType::Suburban => write!(f, "SUBURBAN"),
            RegionType::Rural => write!(f, "RURAL"),
        }
    }
}

/// A radio transmitter taking part in shared-spectrum coordination.
///
/// Static attributes are public. The current transmit power is kept
/// private so that it can never exceed [`Device::max_power`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DeviceRecord", into = "DeviceRecord")]
pub struct Device {
    /// Unique id.
    pub id: DeviceId,
    /// Position of the antenna.
    pub location: Location,
    /// Antenna height above ground, in meters.
    pub height: f64,
    /// Regulatory category.
    pub category: Category,
    /// Whether the device is installed indoors.
    pub indoor: bool,
    /// Region classification.
    pub region: RegionType,
    /// Maximum EIRP in dBm.
    pub max_power: f64,
    tx_power: f64,
    /// Coexistence group (sub-group) id.
    pub coex_group: u32,
    /// Devices sharing a no-edge group never interfere with each other.
    pub no_edge_group: Option<u32>,
    /// Devices sharing a common-node group never interfere with each other.
    pub common_node_group: Option<u32>,
    /// Assigned color, 0 when unassigned.
    pub color: u32,
    /// Assigned channel indices.
    pub channels: BTreeSet<u32>,
    /// Received signal per grid cell, present under area coordination.
    pub coverage: Option<CoverageMap>,
}

impl Device {
    /// Create a device transmitting at its maximum power.
    pub fn new(
        id: impl Into<DeviceId>,
        location: Location,
        height: f64,
        category: Category,
        max_power: f64,
    ) -> Self {
        Self {
            id: id.into(),
            location,
            height,
            category,
            indoor: category == Category::A,
            region: RegionType::Rural,
            max_power,
            tx_power: max_power,
            coex_group: 0,
            no_edge_group: None,
            common_node_group: None,
            color: 0,
            channels: BTreeSet::new(),
            coverage: None,
        }
    }

    /// Set the region classification.
    pub fn with_region(mut self, region: RegionType) -> Self {
        self.region = region;
        self
    }

    /// Set the indoor flag.
    pub fn with_indoor(mut self, indoor: bool) -> Self {
        self.indoor = indoor;
        self
    }

    /// Set the coexistence group.
    pub fn with_coex_group(mut self, group: u32) -> Self {
        self.coex_group = group;
        self
    }

    /// Current transmit power in dBm.
    #[inline]
    pub fn tx_power(&self) -> f64 {
        self.tx_power
    }

    /// Set the transmit power, clamped to the maximum.
    pub fn set_power(&mut self, power: f64) {
        self.tx_power = power.min(self.max_power);
    }

    /// Restore the transmit power to the maximum.
    pub fn reset_power(&mut self) {
        self.tx_power = self.max_power;
    }

    /// Whether a color has been assigned.
    #[inline]
    pub fn is_colored(&self) -> bool {
        self.color != 0
    }

    /// Drop color and channel assignment.
    pub fn clear_assignment(&mut self) {
        self.color = 0;
        self.channels.clear();
    }

    /// Whether this device and `other` share an exempt grouping.
    pub fn shares_exempt_group(&self, other: &Device) -> bool {
        let same = |a: Option<u32>, b: Option<u32>| matches!((a, b), (Some(x), Some(y)) if x == y);
        same(self.no_edge_group, other.no_edge_group)
            || same(self.common_node_group, other.common_node_group)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} cxg={} {:.1}/{:.1} dBm",
            self.id, self.category, self.location, self.coex_group, self.tx_power, self.max_power
        )
    }
}

/// Serialized shape of a device, shared by scenario and checkpoint files.
///
/// Coverage maps are not part of the record; they are stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device id.
    pub id: DeviceId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Antenna height above ground.
    pub agl: f64,
    /// Maximum EIRP.
    pub eirp: f64,
    /// Current transmit power; missing means maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<f64>,
    /// Region classification.
    pub region_type: RegionType,
    /// Indoor flag.
    pub indoor: bool,
    /// Category.
    pub cat: Category,
    /// Coexistence group.
    #[serde(rename = "CxG", default)]
    pub cxg: u32,
    /// No-edge group.
    #[serde(rename = "NEG", default, skip_serializing_if = "Option::is_none")]
    pub neg: Option<u32>,
    /// Common-node group.
    #[serde(rename = "CNG", default, skip_serializing_if = "Option::is_none")]
    pub cng: Option<u32>,
    /// Assigned color.
    #[serde(default)]
    pub color: u32,
    /// Assigned channels.
    #[serde(default)]
    pub channels: BTreeSet<u32>,
}

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        let mut device = Device {
            id: r.id,
            location: Location::new(r.latitude, r.longitude),
            height: r.agl,
            category: r.cat,
            indoor: r.indoor,
            region: r.region_type,
            max_power: r.eirp,
            tx_power: r.eirp,
            coex_group: r.cxg,
            no_edge_group: r.neg,
            common_node_group: r.cng,
            color: r.color,
            channels: r.channels,
            coverage: None,
        };
        if let Some(power) = r.tx_power {
            device.set_power(power);
        }
        device
    }
}

impl From<Device> for DeviceRecord {
    fn from(d: Device) -> Self {
        DeviceRecord {
            id: d.id,
            latitude: d.location.lat,
            longitude: d.location.lon,
            agl: d.height,
            eirp: d.max_power,
            tx_power: Some(d.tx_power),
            region_type: d.region,
            indoor: d.indoor,
            cat: d.category,
            cxg: d.coex_group,
            neg: d.no_edge_group,
            cng: d.common_node_group,
            color: d.color,
            channels: d.channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Device {
        Device::new("7", Location::new(36.84, -76.0), 6.0, Category::A, 26.0)
    }

    #[test]
    fn test_power_clamped_to_max() {
        let mut d = device();
        d.set_power(30.0);
        assert_eq!(d.tx_power(), 26.0);

        d.set_power(20.0);
        assert_eq!(d.tx_power(), 20.0);

        d.reset_power();
        assert_eq!(d.tx_power(), 26.0);
    }

    #[test]
    fn test_exempt_groups() {
        let mut a = device();
        let mut b = device();
        assert!(!a.shares_exempt_group(&b));

        a.no_edge_group = Some(3);
        assert!(!a.shares_exempt_group(&b));

        b.no_edge_group = Some(3);
        assert!(a.shares_exempt_group(&b));

        b.no_edge_group = Some(4);
        a.common_node_group = Some(1);
        b.common_node_group = Some(1);
        assert!(a.shares_exempt_group(&b));
    }

    #[test]
    fn test_record_field_names() {
        let mut d = device().with_coex_group(2);
        d.color = 3;
        d.channels.insert(5);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["cat"], "cata");
        assert_eq!(json["region_type"], "RURAL");
        assert_eq!(json["CxG"], 2);
        assert_eq!(json["agl"], 6.0);
        assert!(json.get("NEG").is_none());

        let back: Device = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_record_clamps_power() {
        let json = r#"{"id":"1","latitude":1.0,"longitude":2.0,"agl":3.0,"eirp":26.0,
            "tx_power":40.0,"region_type":"URBAN","indoor":true,"cat":"cata"}"#;
        let d: Device = serde_json::from_str(json).unwrap();
        assert_eq!(d.tx_power(), 26.0);
        assert_eq!(d.coex_group, 0);
        assert_eq!(d.color, 0);
        assert!(d.channels.is_empty());
    }

    #[test]
    fn test_clear_assignment() {
        let mut d = device();
        d.color = 2;
        d.channels.extend([1, 2]);
        assert!(d.is_colored());
        d.clear_assignment();
        assert!(!d.is_colored());
        assert!(d.channels.is_empty());
    }
}
