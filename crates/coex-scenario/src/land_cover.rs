//! Land-cover classification of device locations.

use std::fmt;

use coex_ir::{Location, RegionType};
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Land-cover class of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverClass {
    DenseUrban,
    Urban,
    Suburban,
    Rural,
    Water,
}

impl LandCoverClass {
    /// Region type of devices placed here; `None` for water.
    pub fn region_type(self) -> Option<RegionType> {
        match self {
            LandCoverClass::DenseUrban | LandCoverClass::Urban => Some(RegionType::Urban),
            LandCoverClass::Suburban => Some(RegionType::Suburban),
            LandCoverClass::Rural => Some(RegionType::Rural),
            LandCoverClass::Water => None,
        }
    }
}

impl fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandCoverClass::DenseUrban => "dense urban",
            LandCoverClass::Urban => "urban",
            LandCoverClass::Suburban => "suburban",
            LandCoverClass::Rural => "rural",
            LandCoverClass::Water => "water",
        };
        f.write_str(name)
    }
}

/// National Land Cover Database code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NlcdCode(pub u8);

impl NlcdCode {
    /// Open water.
    pub const WATER: NlcdCode = NlcdCode(11);
    /// Developed, low intensity.
    pub const SUBURBAN: NlcdCode = NlcdCode(22);
    /// Developed, medium intensity.
    pub const URBAN: NlcdCode = NlcdCode(23);
    /// Developed, high intensity.
    pub const DENSE_URBAN: NlcdCode = NlcdCode(24);

    /// Class of the code. Codes without a dedicated class are rural.
    pub fn class(self) -> LandCoverClass {
        match self {
            NlcdCode::DENSE_URBAN => LandCoverClass::DenseUrban,
            NlcdCode::URBAN => LandCoverClass::Urban,
            NlcdCode::SUBURBAN => LandCoverClass::Suburban,
            NlcdCode::WATER => LandCoverClass::Water,
            _ => LandCoverClass::Rural,
        }
    }
}

/// Classifies locations for the scenario generator.
pub trait LandCover: Send + Sync {
    /// Land-cover class at `location`.
    fn classify(&self, location: Location) -> LandCoverClass;
}

/// The same class everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLandCover(pub LandCoverClass);

impl Default for UniformLandCover {
    fn default() -> Self {
        Self(LandCoverClass::Rural)
    }
}

impl LandCover for UniformLandCover {
    fn classify(&self, _location: Location) -> LandCoverClass {
        self.0
    }
}

/// Random NLCD codes drawn per location, for runs without land-cover data.
///
/// Codes 21, 22, 23, 24 and 11 are drawn with weights 0.1, 0.2, 0.2, 0.45
/// and 0.05. The draw is seeded by the location, so the same location always
/// gets the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntheticNlcd {
    seed: u64,
}

impl SyntheticNlcd {
    const CODES: [NlcdCode; 5] = [
        NlcdCode(21),
        NlcdCode::SUBURBAN,
        NlcdCode::URBAN,
        NlcdCode::DENSE_URBAN,
        NlcdCode::WATER,
    ];
    const WEIGHTS: [f64; 5] = [0.1, 0.2, 0.2, 0.45, 0.05];

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Code drawn for `location`.
    pub fn code(&self, location: Location) -> NlcdCode {
        let mixed = self.seed
            ^ location.lat.to_bits().rotate_left(17)
            ^ location.lon.to_bits().rotate_left(41);
        let mut rng = StdRng::seed_from_u64(mixed);
        match WeightedIndex::new(Self::WEIGHTS) {
            Ok(dist) => Self::CODES[dist.sample(&mut rng)],
            Err(_) => NlcdCode(21),
        }
    }
}

impl LandCover for SyntheticNlcd {
    fn classify(&self, location: Location) -> LandCoverClass {
        self.code(location).class()
    }
}
