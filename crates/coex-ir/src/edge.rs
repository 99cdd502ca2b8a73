//! Sparse, symmetric edge-weight table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceId;
use crate::error::{IrError, IrResult};
use crate::registry::DeviceRegistry;

/// How interference between two devices is coordinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordination {
    /// Point-to-point received interference.
    #[default]
    Point,
    /// Coverage-grid overlap.
    Area,
}

impl fmt::Display for Coordination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordination::Point => write!(f, "point"),
            Coordination::Area => write!(f, "area"),
        }
    }
}

impl FromStr for Coordination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "point" => Ok(Coordination::Point),
            "area" => Ok(Coordination::Area),
            other => Err(format!("unknown coordination mode '{other}'")),
        }
    }
}

/// Unordered pair of device ids, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    first: DeviceId,
    second: DeviceId,
}

impl EdgeKey {
    /// Create a key for two distinct devices in either order.
    pub fn new(a: DeviceId, b: DeviceId) -> IrResult<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Ok(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => Err(IrError::SelfEdge(a)),
        }
    }

    /// The lexicographically smaller id.
    #[inline]
    pub fn first(&self) -> &DeviceId {
        &self.first
    }

    /// The lexicographically larger id.
    #[inline]
    pub fn second(&self) -> &DeviceId {
        &self.second
    }

    /// Whether `id` is an endpoint.
    #[inline]
    pub fn touches(&self, id: &DeviceId) -> bool {
        &self.first == id || &self.second == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other(&self, id: &DeviceId) -> Option<&DeviceId> {
        if &self.first == id {
            Some(&self.second)
        } else if &self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Interference weights for unordered device pairs.
///
/// Only weights in (0, 1] are stored. The table carries the name of the
/// propagation model and the coordination mode that produced it, so a
/// reloaded checkpoint can be matched to its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWeightTable {
    model: String,
    coordination: Coordination,
    entries: BTreeMap<EdgeKey, f64>,
}

impl EdgeWeightTable {
    /// Create an empty table.
    pub fn new(model: impl Into<String>, coordination: Coordination) -> Self {
        Self {
            model: model.into(),
            coordination,
            entries: BTreeMap::new(),
        }
    }

    /// Build a table from computed weights, dropping pairs with weight <= 0.
    pub fn from_weights(
        model: impl Into<String>,
        coordination: Coordination,
        weights: impl IntoIterator<Item = (EdgeKey, f64)>,
    ) -> IrResult<Self> {
        let mut table = Self::new(model, coordination);
        for (key, weight) in weights {
            table.insert(key, weight)?;
        }
        Ok(table)
    }

    /// Insert a weight. Non-positive weights are dropped, weights above 1 are rejected.
    pub fn insert(&mut self, key: EdgeKey, weight: f64) -> IrResult<()> {
        if weight.is_nan() || weight > 1.0 {
            return Err(IrError::InvalidWeight {
                first: key.first,
                second: key.second,
                weight,
            });
        }
        if weight > 0.0 {
            self.entries.insert(key, weight);
        }
        Ok(())
    }

    /// Name of the propagation model that produced the table.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Coordination mode used for the table.
    #[inline]
    pub fn coordination(&self) -> Coordination {
        self.coordination
    }

    /// Weight of a pair in either order; 0 when absent.
    pub fn get(&self, a: &DeviceId, b: &DeviceId) -> f64 {
        let key = if a <= b {
            EdgeKey {
                first: a.clone(),
                second: b.clone(),
            }
        } else {
            EdgeKey {
                first: b.clone(),
                second: a.clone(),
            }
        };
        self.entries.get(&key).copied().unwrap_or(0.0)
    }

    /// Whether a pair has a stored weight.
    pub fn contains(&self, a: &DeviceId, b: &DeviceId) -> bool {
        self.get(a, b) > 0.0
    }

    /// Number of stored pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair has a weight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, f64)> + '_ {
        self.entries.iter().map(|(k, w)| (k, *w))
    }

    /// Entries with weight strictly greater than `threshold`.
    pub fn edges_above(&self, threshold: f64) -> impl Iterator<Item = (&EdgeKey, f64)> + '_ {
        self.iter().filter(move |(_, w)| *w > threshold)
    }

    /// Smallest weight above `threshold` among pairs with both ends in `members`.
    pub fn min_weight_above(&self, members: &BTreeSet<DeviceId>, threshold: f64) -> Option<f64> {
        self.edges_above(threshold)
            .filter(|(k, _)| members.contains(&k.first) && members.contains(&k.second))
            .map(|(_, w)| w)
            .min_by(f64::total_cmp)
    }

    /// Every id referenced by an entry.
    pub fn device_ids(&self) -> BTreeSet<DeviceId> {
        self.entries
            .keys()
            .flat_map(|k| [k.first.clone(), k.second.clone()])
            .collect()
    }

    /// Fail if an entry references a device missing from `registry`.
    pub fn check_against(&self, registry: &DeviceRegistry) -> IrResult<()> {
        for key in self.entries.keys() {
            for id in [&key.first, &key.second] {
                if !registry.contains(id) {
                    return Err(IrError::UnknownDevice {
                        first: key.first.clone(),
                        second: key.second.clone(),
                        missing: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
