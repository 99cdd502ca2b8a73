//! Coex propagation and edge-weight construction
//!
//! Turns a device registry into an [`EdgeWeightTable`](coex_ir::EdgeWeightTable):
//! a sparse map from device pairs to interference weights in (0, 1].
//!
//! # Coordination modes
//!
//! | Mode | Weight |
//! |------|--------|
//! | Point | max over both directions of the received interference, mapped linearly from `[i_min, i_max]` onto `[0, 1]` |
//! | Area | shared coverage cells divided by the smaller coverage |
//!
//! Pairs farther apart than the configured range, or sharing a no-edge or
//! common-node group, get weight 0 without invoking the model.
//!
//! # Example
//!
//! ```rust
//! use coex_ir::{Category, Device, DeviceRegistry, Location};
//! use coex_prop::{EdgeWeightBuilder, EdgeWeightConfig, ModelConfig, ModelRegistry};
//!
//! let registry = DeviceRegistry::from_devices([
//!     Device::new("1", Location::new(36.840, -76.0), 6.0, Category::A, 26.0),
//!     Device::new("2", Location::new(36.845, -76.0), 6.0, Category::A, 26.0),
//! ]).unwrap();
//!
//! let model = ModelRegistry::with_builtins()
//!     .create("freespace", ModelConfig::new("freespace"))
//!     .unwrap();
//! let table = EdgeWeightBuilder::new(model.as_ref(), EdgeWeightConfig::default())
//!     .build(&registry)
//!     .unwrap();
//!
//! assert_eq!(table.model(), "freespace");
//! assert_eq!(table.len(), 1);
//! ```

pub mod builder;
pub mod coverage;
pub mod error;
pub mod free_space;
pub mod geo;
pub mod grid;
pub mod model;
pub mod registry;

pub use builder::{EdgeWeightBuilder, EdgeWeightConfig, normalize_interference};
pub use coverage::{compute_all_coverage, compute_coverage, overlap_ratio, prepare_coverage};
pub use error::{PropError, PropResult};
pub use free_space::FreeSpaceModel;
pub use grid::{Area, AreaGrid};
pub use model::{ModelConfig, PropagationModel};
pub use registry::{KNOWN_MODELS, ModelRegistry};
