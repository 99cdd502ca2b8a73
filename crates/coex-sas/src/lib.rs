//! Coex spectrum sharing
//!
//! Partitions an interference graph into connected components, colors every
//! component per coexistence group and maps the colors onto channel blocks.
//! Components that need more colors than there are channels are split again
//! at a higher threshold until they fit or the threshold reaches 1.0.
//!
//! # Pipeline
//!
//! ```text
//! EdgeWeightTable ──► partition ──► color_component ──► assign_channels
//!                        ▲                │
//!                        └── escalate ◄───┘  (chromatic > channels)
//! ```
//!
//! [`approach3`] offers an alternative estimate that skips coloring: each
//! device counts the coexistence groups it would share bandwidth with.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use coex_ir::{Category, Coordination, Device, DeviceRegistry, EdgeKey, EdgeWeightTable, Location};
//! use coex_sas::{ColoringConfig, ColoringEngine, assign_channels};
//!
//! let mut registry = DeviceRegistry::from_devices(["A", "B", "C", "D"].iter().enumerate().map(|(i, id)| {
//!     Device::new(*id, Location::new(36.8, -76.0), 6.0, Category::A, 26.0)
//!         .with_coex_group(if i < 2 { 1 } else { 2 })
//! })).unwrap();
//!
//! let table = EdgeWeightTable::from_weights("freespace", Coordination::Point, [
//!     (EdgeKey::new("A".into(), "B".into()).unwrap(), 0.05),
//!     (EdgeKey::new("A".into(), "C".into()).unwrap(), 0.6),
//!     (EdgeKey::new("B".into(), "D".into()).unwrap(), 0.6),
//!     (EdgeKey::new("C".into(), "D".into()).unwrap(), 0.05),
//! ]).unwrap();
//!
//! let engine = ColoringEngine::new(ColoringConfig::default()).unwrap();
//! let outcome = engine.color_all_at(&registry.ids(), &registry, &table, 0.1).unwrap();
//! assert_eq!(outcome.components.len(), 2);
//!
//! assign_channels(&mut registry, &outcome.components, &[1, 2, 3, 4, 5, 6, 7, 8], false).unwrap();
//! assert_eq!(registry.get(&"A".into()).unwrap().channels, BTreeSet::from([1, 2, 3, 4]));
//! ```

pub mod approach3;
pub mod channels;
pub mod coloring;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod partition;

pub use approach3::{ClusterEstimate, estimate, estimate_all};
pub use channels::{assign_channels, channel_block};
pub use coloring::{
    ColoredComponent, color_component, color_component_in, split_by_group, welsh_powell,
};
pub use config::{ConfigError, RunConfig};
pub use engine::{ColoringConfig, ColoringEngine, ColoringOutcome, MAX_THRESHOLD, MIN_TH_STEP, UnsatisfiedColoring};
pub use error::{SasError, SasResult};
pub use evaluation::{
    BandwidthReport, DeviceBandwidth, aggregate_dbm, approach3_bandwidth, bandwidth_report,
    channel_utilization, residual_interference,
};
pub use partition::{Component, partition, partition_graph};
