//! Owned device collection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceId};
use crate::error::{IrError, IrResult};

/// All devices of one run, keyed and iterated in id order.
///
/// The registry is passed by reference into every phase. Parallel phases
/// only read from it; colors and channels are written in a single-threaded
/// step afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Device>", into = "Vec<Device>")]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, Device>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from devices, rejecting duplicate ids.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> IrResult<Self> {
        let mut registry = Self::new();
        for device in devices {
            registry.insert(device)?;
        }
        Ok(registry)
    }

    /// Add a device.
    pub fn insert(&mut self, device: Device) -> IrResult<()> {
        if self.devices.contains_key(&device.id) {
            return Err(IrError::DuplicateDevice(device.id));
        }
        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    /// Look up a device.
    #[inline]
    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Look up a device mutably.
    #[inline]
    pub fn get_mut(&mut self, id: &DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id)
    }

    /// Look up a device, failing with a contextual error.
    pub fn require(&self, id: &DeviceId, context: &str) -> IrResult<&Device> {
        self.devices.get(id).ok_or_else(|| IrError::DeviceNotFound {
            id: id.clone(),
            context: Some(context.to_string()),
        })
    }

    /// Look up a device mutably, failing with a contextual error.
    pub fn require_mut(&mut self, id: &DeviceId, context: &str) -> IrResult<&mut Device> {
        self.devices.get_mut(id).ok_or_else(|| IrError::DeviceNotFound {
            id: id.clone(),
            context: Some(context.to_string()),
        })
    }

    /// Whether a device is registered.
    #[inline]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    /// Number of devices.
    #[inline]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over devices in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> + '_ {
        self.devices.values()
    }

    /// Iterate mutably over devices in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> + '_ {
        self.devices.values_mut()
    }

    /// All device ids.
    pub fn ids(&self) -> BTreeSet<DeviceId> {
        self.devices.keys().cloned().collect()
    }

    /// Coexistence group of a device.
    pub fn coex_group(&self, id: &DeviceId) -> Option<u32> {
        self.devices.get(id).map(|d| d.coex_group)
    }

    /// Distinct coexistence groups present.
    pub fn coex_groups(&self) -> BTreeSet<u32> {
        self.devices.values().map(|d| d.coex_group).collect()
    }

    /// Reset every device's color and channels.
    pub fn clear_assignments(&mut self) {
        for device in self.devices.values_mut() {
            device.clear_assignment();
        }
    }

    /// Restore every device to its maximum power.
    pub fn reset_power(&mut self) {
        for device in self.devices.values_mut() {
            device.reset_power();
        }
    }

    /// Whether every device carries a coverage map.
    pub fn has_coverage(&self) -> bool {
        !self.devices.is_empty() && self.devices.values().all(|d| d.coverage.is_some())
    }
}

impl From<Vec<Device>> for DeviceRegistry {
    /// Later duplicates replace earlier ones; use [`DeviceRegistry::from_devices`]
    /// to reject them instead.
    fn from(devices: Vec<Device>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}

impl From<DeviceRegistry> for Vec<Device> {
    fn from(registry: DeviceRegistry) -> Self {
        registry.devices.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a Device;
    type IntoIter = std::collections::btree_map::Values<'a, DeviceId, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.values()
    }
}
