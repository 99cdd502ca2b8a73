//! Scenario generation settings.
//!
//! Every setting must be present in a scenario file; unknown keys are
//! rejected. [`ScenarioConfig::default`] holds the reference deployment and
//! can be written out as a starting point.

use std::path::Path;

use coex_ir::Location;
use coex_prop::Area;
use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};
use crate::land_cover::LandCoverClass;

/// One value per populated land-cover class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByLandCover<T> {
    pub dense_urban: T,
    pub urban: T,
    pub suburban: T,
    pub rural: T,
}

impl<T> ByLandCover<T> {
    /// Same value for every class.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            dense_urban: value.clone(),
            urban: value.clone(),
            suburban: value.clone(),
            rural: value,
        }
    }

    /// Value for `class`. Water uses the rural value.
    pub fn get(&self, class: LandCoverClass) -> &T {
        match class {
            LandCoverClass::DenseUrban => &self.dense_urban,
            LandCoverClass::Urban => &self.urban,
            LandCoverClass::Suburban => &self.suburban,
            LandCoverClass::Rural | LandCoverClass::Water => &self.rural,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        [
            ("dense_urban", &self.dense_urban),
            ("urban", &self.urban),
            ("suburban", &self.suburban),
            ("rural", &self.rural),
        ]
        .into_iter()
    }
}

/// Antenna height distribution: a weighted choice of integer ranges in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeightProfile {
    /// Probability of each range.
    pub ratio: Vec<f64>,
    /// Lower bounds.
    pub low: Vec<u32>,
    /// Upper bounds, inclusive.
    pub high: Vec<u32>,
}

impl HeightProfile {
    pub fn new(ratio: &[f64], low: &[u32], high: &[u32]) -> Self {
        Self {
            ratio: ratio.to_vec(),
            low: low.to_vec(),
            high: high.to_vec(),
        }
    }

    fn validate(&self, what: &str) -> ScenarioResult<()> {
        if self.ratio.is_empty()
            || self.ratio.len() != self.low.len()
            || self.ratio.len() != self.high.len()
        {
            return Err(ScenarioError::Configuration(format!(
                "{what}: ratio, low and high need the same non-zero length"
            )));
        }
        if self.ratio.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(ScenarioError::Configuration(format!(
                "{what}: ratios must lie in [0, 1]"
            )));
        }
        let sum: f64 = self.ratio.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ScenarioError::Configuration(format!(
                "{what}: ratios sum to {sum}, expected 1"
            )));
        }
        if let Some((l, h)) = self.low.iter().zip(&self.high).find(|(l, h)| l > h) {
            return Err(ScenarioError::Configuration(format!(
                "{what}: height range {l}..={h} is empty"
            )));
        }
        Ok(())
    }
}

/// EIRP range in dBm/10 MHz, drawn uniformly as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EirpRange {
    pub low: i32,
    /// Inclusive.
    pub high: i32,
}

impl EirpRange {
    pub fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Fixed EIRP.
    pub fn fixed(value: i32) -> Self {
        Self::new(value, value)
    }
}

/// Antenna settings of one device category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryProfile {
    /// Share of indoor devices.
    pub indoor_ratio: f64,
    /// Antenna heights per land-cover class.
    pub height: ByLandCover<HeightProfile>,
    /// EIRP per land-cover class.
    pub eirp: ByLandCover<EirpRange>,
}

/// Settings of a random deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Devices per km².
    pub density_per_km2: f64,
    /// Latitude of the area centre.
    pub center_lat: f64,
    /// Longitude of the area centre.
    pub center_lon: f64,
    /// East-west extent in km.
    pub width_km: f64,
    /// North-south extent in km.
    pub length_km: f64,
    /// Share of category A devices per land-cover class; the rest are category B.
    pub cata_ratio: ByLandCover<f64>,
    /// Category A antennas.
    pub cata: CategoryProfile,
    /// Category B antennas.
    pub catb: CategoryProfile,
    /// Deploy on water instead of dropping those locations.
    pub water_deploy: bool,
    /// Devices are spread over groups `0..=num_coex_groups`.
    pub num_coex_groups: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            density_per_km2: 20.0,
            center_lat: 36.846849,
            center_lon: -76.000229,
            width_km: 5.0,
            length_km: 5.0,
            cata_ratio: ByLandCover {
                dense_urban: 0.9,
                urban: 0.9,
                suburban: 0.9,
                rural: 0.95,
            },
            cata: CategoryProfile {
                indoor_ratio: 1.0,
                height: ByLandCover {
                    dense_urban: HeightProfile::new(&[0.5, 0.25, 0.25], &[3, 18, 33], &[15, 30, 60]),
                    urban: HeightProfile::new(&[0.5, 0.5], &[3, 6], &[3, 18]),
                    suburban: HeightProfile::new(&[0.7, 0.3], &[3, 6], &[3, 12]),
                    rural: HeightProfile::new(&[0.8, 0.2], &[3, 6], &[3, 6]),
                },
                eirp: ByLandCover::uniform(EirpRange::fixed(26)),
            },
            catb: CategoryProfile {
                indoor_ratio: 0.0,
                height: ByLandCover {
                    dense_urban: HeightProfile::new(&[1.0], &[6], &[30]),
                    urban: HeightProfile::new(&[1.0], &[6], &[30]),
                    suburban: HeightProfile::new(&[1.0], &[6], &[100]),
                    rural: HeightProfile::new(&[1.0], &[6], &[100]),
                },
                eirp: ByLandCover {
                    dense_urban: EirpRange::new(40, 47),
                    urban: EirpRange::new(40, 47),
                    suburban: EirpRange::fixed(47),
                    rural: EirpRange::fixed(47),
                },
            },
            water_deploy: false,
            num_coex_groups: 3,
        }
    }
}

impl ScenarioConfig {
    /// Load settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScenarioResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: ScenarioConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ScenarioError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the settings as YAML.
    pub fn to_yaml(&self) -> ScenarioResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| ScenarioError::Configuration(e.to_string()))
    }

    /// Validate the settings.
    pub fn validate(&self) -> ScenarioResult<()> {
        if !(self.density_per_km2.is_finite() && self.density_per_km2 >= 0.0) {
            return Err(ScenarioError::Configuration(format!(
                "density_per_km2 must be non-negative, got {}",
                self.density_per_km2
            )));
        }
        if !(-90.0..=90.0).contains(&self.center_lat) || !(-180.0..=180.0).contains(&self.center_lon)
        {
            return Err(ScenarioError::Configuration(format!(
                "area centre {} is not a valid coordinate",
                self.center()
            )));
        }
        for (name, extent) in [("width_km", self.width_km), ("length_km", self.length_km)] {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(ScenarioError::Configuration(format!(
                    "{name} must be positive, got {extent}"
                )));
            }
        }
        for (class, ratio) in self.cata_ratio.iter() {
            if !(0.0..=1.0).contains(ratio) {
                return Err(ScenarioError::Configuration(format!(
                    "cata_ratio.{class} must lie in [0, 1], got {ratio}"
                )));
            }
        }
        for (cat, profile) in [("cata", &self.cata), ("catb", &self.catb)] {
            if !(0.0..=1.0).contains(&profile.indoor_ratio) {
                return Err(ScenarioError::Configuration(format!(
                    "{cat}.indoor_ratio must lie in [0, 1], got {}",
                    profile.indoor_ratio
                )));
            }
            for (class, height) in profile.height.iter() {
                height.validate(&format!("{cat}.height.{class}"))?;
            }
            for (class, eirp) in profile.eirp.iter() {
                if eirp.low > eirp.high {
                    return Err(ScenarioError::Configuration(format!(
                        "{cat}.eirp.{class}: range {}..={} is empty",
                        eirp.low, eirp.high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Centre of the deployment area.
    pub fn center(&self) -> Location {
        Location::new(self.center_lat, self.center_lon)
    }

    /// The deployment area.
    pub fn area(&self) -> Area {
        Area::new(self.center(), self.width_km, self.length_km)
    }

    /// Number of candidate locations drawn.
    pub fn location_count(&self) -> usize {
        (self.width_km * self.length_km * self.density_per_km2) as usize
    }

    /// Profile of a category A or B device.
    pub fn profile(&self, cata: bool) -> &CategoryProfile {
        if cata { &self.cata } else { &self.catb }
    }
}
