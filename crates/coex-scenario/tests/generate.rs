//! Deployment generation tests.

use coex_ir::{Category, DeviceId, Location, RegionType};
use coex_scenario::{
    LandCover, LandCoverClass, ScenarioConfig, ScenarioGenerator, SyntheticNlcd,
    assign_coex_groups,
};
use proptest::prelude::*;

/// Water west of the centre longitude, dense urban east of it.
struct Shoreline {
    lon: f64,
}

impl LandCover for Shoreline {
    fn classify(&self, location: Location) -> LandCoverClass {
        if location.lon < self.lon {
            LandCoverClass::Water
        } else {
            LandCoverClass::DenseUrban
        }
    }
}

fn config(width_km: f64, density: f64) -> ScenarioConfig {
    ScenarioConfig {
        width_km,
        length_km: width_km,
        density_per_km2: density,
        ..ScenarioConfig::default()
    }
}

// ============================================================================
// Land cover
// ============================================================================

#[test]
fn test_shoreline_keeps_land_only() {
    let config = config(2.0, 50.0);
    let center = config.center();
    let scenario = ScenarioGenerator::new(config, 3)
        .unwrap()
        .generate(&Shoreline { lon: center.lon })
        .unwrap();

    assert!(!scenario.devices.is_empty());
    assert!(scenario.devices.len() < 200);
    for device in scenario.devices.iter() {
        assert!(device.location.lon >= center.lon);
        assert_eq!(device.region, RegionType::Urban);
    }
}

#[test]
fn test_ids_are_dense_after_dropping() {
    let config = config(2.0, 50.0);
    let center = config.center();
    let scenario = ScenarioGenerator::new(config, 4)
        .unwrap()
        .generate(&Shoreline { lon: center.lon })
        .unwrap();

    let n = scenario.devices.len();
    for i in 1..=n {
        assert!(scenario.devices.contains(&DeviceId::from(i)));
    }
}

#[test]
fn test_synthetic_nlcd_mix() {
    let scenario = ScenarioGenerator::new(ScenarioConfig::default(), 1)
        .unwrap()
        .generate(&SyntheticNlcd::new(1))
        .unwrap();

    // About 5% of locations fall on water.
    assert!(scenario.devices.len() < 500);
    assert!(scenario.devices.len() > 430);
    assert!(scenario.devices.iter().any(|d| d.category == Category::A));
    assert!(scenario.devices.iter().any(|d| d.category == Category::B));
}

#[test]
fn test_different_seeds_differ() {
    let a = ScenarioGenerator::new(config(1.0, 20.0), 1)
        .unwrap()
        .generate(&SyntheticNlcd::default())
        .unwrap();
    let b = ScenarioGenerator::new(config(1.0, 20.0), 2)
        .unwrap()
        .generate(&SyntheticNlcd::default())
        .unwrap();
    assert_ne!(a.devices, b.devices);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = ScenarioConfig::default();
    config.cata_ratio.urban = 1.5;
    assert!(ScenarioGenerator::new(config, 0).is_err());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_devices_follow_profiles(seed in any::<u64>(), groups in 0u32..6) {
        let config = config(1.0, 30.0);
        let mut scenario = ScenarioGenerator::new(config.clone(), seed)
            .unwrap()
            .generate(&SyntheticNlcd::new(seed))
            .unwrap();
        assign_coex_groups(&mut scenario.devices, groups, seed);

        for device in scenario.devices.iter() {
            prop_assert!(device.coex_group <= groups);
            match device.category {
                Category::A => {
                    prop_assert!(device.indoor);
                    prop_assert_eq!(device.max_power, 26.0);
                    prop_assert!((3.0..=60.0).contains(&device.height));
                }
                Category::B => {
                    prop_assert!(!device.indoor);
                    prop_assert!((40.0..=47.0).contains(&device.max_power));
                    prop_assert!((6.0..=100.0).contains(&device.height));
                }
            }
        }
    }
}
