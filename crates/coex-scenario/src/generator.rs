//! Random device deployments.

use coex_ir::{Category, Device, DeviceId, DeviceRegistry, RegionType};
use coex_prop::Area;
use coex_prop::geo::offset;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{HeightProfile, ScenarioConfig};
use crate::error::{ScenarioError, ScenarioResult};
use crate::land_cover::{LandCover, LandCoverClass};

/// A generated deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Deployment area.
    pub area: Area,
    /// Generated devices with ids "1", "2", ...
    #[serde(rename = "CBSDs")]
    pub devices: DeviceRegistry,
}

/// Draws device deployments from a [`ScenarioConfig`].
///
/// Locations are uniform over the area. Each location's land-cover class
/// decides the region type and the category, height and EIRP distributions
/// of the device placed there. Water locations are dropped unless
/// `water_deploy` is set, in which case they count as rural.
pub struct ScenarioGenerator {
    config: ScenarioConfig,
    rng: StdRng,
}

impl ScenarioGenerator {
    /// Create a generator, validating the settings.
    pub fn new(config: ScenarioConfig, seed: u64) -> ScenarioResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The generator settings.
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Draw one deployment.
    #[instrument(skip_all, fields(locations = self.config.location_count()))]
    pub fn generate(&mut self, land_cover: &dyn LandCover) -> ScenarioResult<Scenario> {
        let area = self.config.area();
        let half_w = self.config.width_km / 2.0;
        let half_l = self.config.length_km / 2.0;

        let mut devices = DeviceRegistry::new();
        let mut dropped = 0;
        for _ in 0..self.config.location_count() {
            let east = self.rng.gen_range(-half_w..=half_w);
            let north = self.rng.gen_range(-half_l..=half_l);
            let location = offset(area.center, east, north);

            let class = land_cover.classify(location);
            let region = match class.region_type() {
                Some(region) => region,
                None if self.config.water_deploy => RegionType::Rural,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            let id = DeviceId::from(devices.len() + 1);
            let device = self.draw_device(id, location, class, region)?;
            devices.insert(device)?;
        }

        if dropped > 0 {
            debug!("Dropped {} locations on water", dropped);
        }
        info!(
            "Generated {} devices in {:.1} km²",
            devices.len(),
            area.surface_km2()
        );
        Ok(Scenario { area, devices })
    }

    fn draw_device(
        &mut self,
        id: DeviceId,
        location: coex_ir::Location,
        class: LandCoverClass,
        region: RegionType,
    ) -> ScenarioResult<Device> {
        let cata = self.rng.gen_bool(*self.config.cata_ratio.get(class));
        let profile = self.config.profile(cata);
        let indoor = self.rng.gen_bool(profile.indoor_ratio);
        let height = draw_height(&mut self.rng, profile.height.get(class))?;
        let eirp = profile.eirp.get(class);
        let eirp = self.rng.gen_range(eirp.low..=eirp.high);

        let category = if cata { Category::A } else { Category::B };
        Ok(Device::new(id, location, f64::from(height), category, f64::from(eirp))
            .with_region(region)
            .with_indoor(indoor))
    }
}

fn draw_height(rng: &mut StdRng, profile: &HeightProfile) -> ScenarioResult<u32> {
    let choice = WeightedIndex::new(&profile.ratio)
        .map_err(|e| ScenarioError::Configuration(format!("height ratios: {e}")))?;
    let i = choice.sample(rng);
    Ok(rng.gen_range(profile.low[i]..=profile.high[i]))
}

/// Spread devices uniformly over coexistence groups `0..=num_groups`.
///
/// Devices are visited in id order, so the same seed always gives the same
/// assignment.
pub fn assign_coex_groups(registry: &mut DeviceRegistry, num_groups: u32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for device in registry.iter_mut() {
        device.coex_group = rng.gen_range(0..=num_groups);
    }
    info!(
        "Assigned {} devices to {} coexistence groups",
        registry.len(),
        num_groups + 1
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land_cover::UniformLandCover;

    fn small_config() -> ScenarioConfig {
        ScenarioConfig {
            width_km: 1.0,
            length_km: 1.0,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_generate_count_and_ids() {
        let mut generator = ScenarioGenerator::new(small_config(), 0).unwrap();
        let scenario = generator.generate(&UniformLandCover::default()).unwrap();

        assert_eq!(scenario.devices.len(), 20);
        for n in 1..=20_usize {
            assert!(scenario.devices.contains(&n.into()));
        }
    }

    #[test]
    fn test_generate_is_reproducible() {
        let cover = UniformLandCover(LandCoverClass::Urban);
        let a = ScenarioGenerator::new(small_config(), 42)
            .unwrap()
            .generate(&cover)
            .unwrap();
        let b = ScenarioGenerator::new(small_config(), 42)
            .unwrap()
            .generate(&cover)
            .unwrap();
        assert_eq!(a.devices, b.devices);
    }

    #[test]
    fn test_water_dropped_unless_deployed() {
        let water = UniformLandCover(LandCoverClass::Water);
        let scenario = ScenarioGenerator::new(small_config(), 0)
            .unwrap()
            .generate(&water)
            .unwrap();
        assert!(scenario.devices.is_empty());

        let config = ScenarioConfig {
            water_deploy: true,
            ..small_config()
        };
        let scenario = ScenarioGenerator::new(config, 0).unwrap().generate(&water).unwrap();
        assert_eq!(scenario.devices.len(), 20);
        assert!(scenario.devices.iter().all(|d| d.region == RegionType::Rural));
    }

    #[test]
    fn test_profiles_follow_land_cover() {
        let mut config = small_config();
        config.cata_ratio.rural = 1.0;
        let scenario = ScenarioGenerator::new(config, 3)
            .unwrap()
            .generate(&UniformLandCover(LandCoverClass::Rural))
            .unwrap();

        for device in scenario.devices.iter() {
            assert_eq!(device.category, Category::A);
            assert!(device.indoor);
            assert_eq!(device.max_power, 26.0);
            assert!((3.0..=6.0).contains(&device.height));
        }
    }

    #[test]
    fn test_catb_power_range() {
        let mut config = small_config();
        config.cata_ratio.urban = 0.0;
        let scenario = ScenarioGenerator::new(config, 5)
            .unwrap()
            .generate(&UniformLandCover(LandCoverClass::Urban))
            .unwrap();

        for device in scenario.devices.iter() {
            assert_eq!(device.category, Category::B);
            assert!(!device.indoor);
            assert!((40.0..=47.0).contains(&device.max_power));
            assert!((6.0..=30.0).contains(&device.height));
        }
    }

    #[test]
    fn test_devices_inside_area() {
        let scenario = ScenarioGenerator::new(small_config(), 9)
            .unwrap()
            .generate(&UniformLandCover::default())
            .unwrap();
        let center = scenario.area.center;
        for device in scenario.devices.iter() {
            // 0.5 km is about 0.0045° of latitude.
            assert!((device.location.lat - center.lat).abs() < 0.005);
            assert!((device.location.lon - center.lon).abs() < 0.007);
        }
    }

    #[test]
    fn test_coex_groups_are_seeded() {
        let mut a = ScenarioGenerator::new(small_config(), 1)
            .unwrap()
            .generate(&UniformLandCover::default())
            .unwrap()
            .devices;
        let mut b = a.clone();

        assign_coex_groups(&mut a, 3, 11);
        assign_coex_groups(&mut b, 3, 11);
        assert_eq!(a, b);
        assert!(a.iter().all(|d| d.coex_group <= 3));
        assert!(a.coex_groups().len() > 1);
    }
}
