//! Coex device and interference-graph representation
//!
//! This crate holds the state every other coex crate works on: the devices
//! (CBSDs) of a run, the sparse edge-weight table describing how strongly
//! each pair of devices interferes, and a thresholded graph view of that
//! table.
//!
//! # Core Components
//!
//! - **Devices**: [`Device`] with its static radio attributes and mutable
//!   assignment state (power, color, channels, coverage)
//! - **Registry**: [`DeviceRegistry`], the owned collection passed into
//!   every phase of a run
//! - **Edge weights**: [`EdgeWeightTable`] keyed by the unordered [`EdgeKey`]
//!   and tagged with the propagation model and [`Coordination`] mode
//! - **Graph**: [`InterferenceGraph`], the effective edges above a threshold
//!   over a member set
//!
//! # Example
//!
//! ```rust
//! use coex_ir::{Category, Coordination, Device, DeviceRegistry, EdgeKey, EdgeWeightTable, Location};
//!
//! let mut registry = DeviceRegistry::new();
//! registry.insert(Device::new("1", Location::new(36.84, -76.0), 6.0, Category::A, 26.0)).unwrap();
//! registry.insert(Device::new("2", Location::new(36.85, -76.0), 6.0, Category::A, 26.0)).unwrap();
//!
//! let mut table = EdgeWeightTable::new("freespace", Coordination::Point);
//! table.insert(EdgeKey::new("2".into(), "1".into()).unwrap(), 0.4).unwrap();
//!
//! assert_eq!(table.get(&"1".into(), &"2".into()), 0.4);
//! assert!(table.check_against(&registry).is_ok());
//! ```
//!
//! # Serialized device fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `id` | Unique device id |
//! | `latitude`, `longitude` | Position in degrees |
//! | `agl` | Antenna height above ground (m) |
//! | `eirp` | Maximum EIRP (dBm) |
//! | `tx_power` | Current transmit power (dBm) |
//! | `region_type` | `URBAN`, `SUBURBAN` or `RURAL` |
//! | `indoor` | Indoor flag |
//! | `cat` | `cata` or `catb` |
//! | `CxG` | Coexistence group |
//! | `NEG`, `CNG` | Optional no-edge / common-node groups |
//! | `color`, `channels` | Assignment state |

pub mod device;
pub mod edge;
pub mod error;
pub mod graph;
pub mod registry;

pub use device::{
    Category, CoverageMap, Device, DeviceId, DeviceRecord, GridId, Location, RegionType,
};
pub use edge::{Coordination, EdgeKey, EdgeWeightTable};
pub use error::{IrError, IrResult};
pub use graph::InterferenceGraph;
pub use registry::DeviceRegistry;
