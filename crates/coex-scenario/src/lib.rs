//! Coex deployment scenarios
//!
//! Generates random device deployments over a rectangular area. Each drawn
//! location is classified by a [`LandCover`] source, and the class decides
//! the device's region type, category mix, antenna height and EIRP.
//!
//! # Example
//!
//! ```rust
//! use coex_scenario::{ScenarioConfig, ScenarioGenerator, SyntheticNlcd, assign_coex_groups};
//!
//! let config = ScenarioConfig {
//!     width_km: 1.0,
//!     length_km: 1.0,
//!     ..ScenarioConfig::default()
//! };
//! let mut generator = ScenarioGenerator::new(config, 7).unwrap();
//! let mut scenario = generator.generate(&SyntheticNlcd::new(7)).unwrap();
//! assign_coex_groups(&mut scenario.devices, 3, 7);
//!
//! assert!(scenario.devices.len() <= 20);
//! assert!(scenario.devices.iter().all(|d| d.coex_group <= 3));
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod land_cover;

pub use config::{ByLandCover, CategoryProfile, EirpRange, HeightProfile, ScenarioConfig};
pub use error::{ScenarioError, ScenarioResult};
pub use generator::{Scenario, ScenarioGenerator, assign_coex_groups};
pub use land_cover::{LandCover, LandCoverClass, NlcdCode, SyntheticNlcd, UniformLandCover};
