//! Coloring engine with threshold escalation.

use std::collections::BTreeSet;

use coex_ir::{DeviceId, DeviceRegistry, EdgeWeightTable, InterferenceGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::coloring::{ColoredComponent, color_component_in};
use crate::error::{SasError, SasResult};
use crate::partition::partition_graph;

/// Highest threshold; components are accepted as they are here.
pub const MAX_THRESHOLD: f64 = 1.0;

/// Smallest accepted threshold step.
pub const MIN_TH_STEP: f64 = 1e-6;

/// Parameters of the coloring engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoringConfig {
    /// Threshold of the first partition, capped at 1.0.
    pub th_start: f64,
    /// Minimum threshold increase per escalation.
    pub th_step: f64,
    /// Number of available channels.
    pub max_colors: usize,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            th_start: 0.2,
            th_step: 0.1,
            max_colors: 8,
        }
    }
}

impl ColoringConfig {
    /// Check the parameters.
    pub fn validate(&self) -> SasResult<()> {
        if !(self.th_step > 0.0 && self.th_step.is_finite()) {
            return Err(SasError::Configuration(format!(
                "th_step must be positive, got {}",
                self.th_step
            )));
        }
        if self.th_step < MIN_TH_STEP {
            return Err(SasError::Configuration(format!(
                "th_step must be at least {MIN_TH_STEP}, got {}",
                self.th_step
            )));
        }
        if !(self.th_start >= 0.0) {
            return Err(SasError::Configuration(format!(
                "th_start must be non-negative, got {}",
                self.th_start
            )));
        }
        if self.max_colors == 0 {
            return Err(SasError::Configuration(
                "at least one channel must be available".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on escalation levels for one component.
    ///
    /// Saturates at `u32::MAX` for steps too small to count.
    pub fn max_levels(&self) -> u32 {
        let steps = ((MAX_THRESHOLD - self.th_start.min(MAX_THRESHOLD)) / self.th_step).ceil();
        // Float to int casts saturate; NaN becomes 0.
        (steps as u32).saturating_add(1)
    }
}

/// A component whose chromatic number exceeds the channel count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsatisfiedColoring {
    /// Smallest member id of the component.
    pub first_member: DeviceId,
    /// Number of members.
    pub size: usize,
    /// Threshold the component ended at.
    pub threshold: f64,
    /// Colors needed.
    pub chromatic: usize,
    /// Colors available.
    pub max_colors: usize,
}

/// Result of a coloring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColoringOutcome {
    /// Colored components ordered by their smallest member id.
    pub components: Vec<ColoredComponent>,
    /// Components that do not fit into the available channels.
    pub unsatisfied: Vec<UnsatisfiedColoring>,
}

impl ColoringOutcome {
    fn from_components(mut components: Vec<ColoredComponent>, max_colors: usize) -> Self {
        components.sort_by(|a, b| a.first_member().cmp(&b.first_member()));

        let unsatisfied: Vec<UnsatisfiedColoring> = components
            .iter()
            .filter(|c| !c.is_satisfied(max_colors))
            .filter_map(|c| {
                Some(UnsatisfiedColoring {
                    first_member: c.first_member()?.clone(),
                    size: c.len(),
                    threshold: c.threshold,
                    chromatic: c.chromatic,
                    max_colors,
                })
            })
            .collect();

        for u in &unsatisfied {
            warn!(
                "Component at '{}' ({} devices) needs {} colors at threshold {:.3}, {} available",
                u.first_member, u.size, u.chromatic, u.threshold, u.max_colors
            );
        }

        Self {
            components,
            unsatisfied,
        }
    }

    /// Whether every component fits into the available channels.
    pub fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    /// Deepest escalation level reached.
    pub fn max_level(&self) -> u32 {
        self.components.iter().map(|c| c.level).max().unwrap_or(0)
    }

    /// Total number of colored devices.
    pub fn device_count(&self) -> usize {
        self.components.iter().map(ColoredComponent::len).sum()
    }
}

/// Partitions and colors device sets.
#[derive(Debug, Clone)]
pub struct ColoringEngine {
    config: ColoringConfig,
}

impl ColoringEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: ColoringConfig) -> SasResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine configuration.
    pub fn config(&self) -> &ColoringConfig {
        &self.config
    }

    /// Partition and color, raising the threshold of components that need
    /// more colors than there are channels.
    ///
    /// Escalation runs on a worklist of `(members, threshold, level)`
    /// entries. A component is accepted once it fits, or once its threshold
    /// reached 1.0.
    #[instrument(skip_all, fields(devices = ids.len()))]
    pub fn color_all(
        &self,
        ids: &BTreeSet<DeviceId>,
        registry: &DeviceRegistry,
        table: &EdgeWeightTable,
    ) -> SasResult<ColoringOutcome> {
        check_members(ids, registry)?;
        let max_colors = self.config.max_colors;
        let mut worklist = vec![(ids.clone(), self.config.th_start.min(MAX_THRESHOLD), 0_u32)];
        let mut accepted = Vec::new();

        while let Some((members, threshold, level)) = worklist.pop() {
            debug!(
                "Coloring {} devices at threshold {:.3} (level {})",
                members.len(),
                threshold,
                level
            );
            for mut component in color_partition(&members, registry, table, threshold)? {
                component.level = level;
                if component.is_satisfied(max_colors) || threshold >= MAX_THRESHOLD {
                    accepted.push(component);
                    continue;
                }

                let members = component.members();
                match self.next_threshold(&members, table, threshold) {
                    Some(next) => worklist.push((members, next, level + 1)),
                    None => accepted.push(component),
                }
            }
        }

        let outcome = ColoringOutcome::from_components(accepted, max_colors);
        info!(
            "Colored {} devices in {} components, {} unsatisfied, max level {}",
            outcome.device_count(),
            outcome.components.len(),
            outcome.unsatisfied.len(),
            outcome.max_level()
        );
        Ok(outcome)
    }

    /// Partition and color once at a fixed threshold.
    #[instrument(skip_all, fields(devices = ids.len(), threshold = threshold))]
    pub fn color_all_at(
        &self,
        ids: &BTreeSet<DeviceId>,
        registry: &DeviceRegistry,
        table: &EdgeWeightTable,
        threshold: f64,
    ) -> SasResult<ColoringOutcome> {
        check_members(ids, registry)?;
        let components = color_partition(ids, registry, table, threshold)?;
        Ok(ColoringOutcome::from_components(components, self.config.max_colors))
    }

    /// Next threshold above `threshold` that removes at least one edge of
    /// `members`, or `None` when no edge is left.
    ///
    /// The result is the first multiple of `th_step` above `threshold` that
    /// reaches the smallest remaining edge weight, capped at 1.0. When the
    /// step is lost to rounding the smallest weight itself is used.
    pub fn next_threshold(
        &self,
        members: &BTreeSet<DeviceId>,
        table: &EdgeWeightTable,
        threshold: f64,
    ) -> Option<f64> {
        let lowest = table.min_weight_above(members, threshold)?;
        let step = self.config.th_step;
        let mut next = threshold + ((lowest - threshold) / step).ceil() * step;
        if next < lowest {
            next += step;
        }
        if !(next > threshold && next >= lowest) {
            next = lowest;
        }
        Some(next.min(MAX_THRESHOLD))
    }
}

/// Partition `members` and color every component in parallel.
///
/// The thresholded graph is built once and shared by all components.
fn color_partition(
    members: &BTreeSet<DeviceId>,
    registry: &DeviceRegistry,
    table: &EdgeWeightTable,
    threshold: f64,
) -> SasResult<Vec<ColoredComponent>> {
    let graph = InterferenceGraph::induced(table, members, threshold);
    partition_graph(&graph)
        .par_iter()
        .map(|component| color_component_in(&graph, component, registry))
        .collect()
}

fn check_members(ids: &BTreeSet<DeviceId>, registry: &DeviceRegistry) -> SasResult<()> {
    match ids.iter().find(|id| !registry.contains(id)) {
        Some(id) => Err(SasError::InconsistentState(format!(
            "device '{id}' is not in the registry"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coex_ir::{Category, Coordination, Device, EdgeKey, Location};

    fn registry(devices: &[(&str, u32)]) -> DeviceRegistry {
        DeviceRegistry::from_devices(devices.iter().map(|(id, group)| {
            Device::new(*id, Location::new(0.0, 0.0), 3.0, Category::A, 26.0)
                .with_coex_group(*group)
        }))
        .unwrap()
    }

    fn table(entries: &[(&str, &str, f64)]) -> EdgeWeightTable {
        EdgeWeightTable::from_weights(
            "test",
            Coordination::Point,
            entries
                .iter()
                .map(|(a, b, w)| (EdgeKey::new((*a).into(), (*b).into()).unwrap(), *w)),
        )
        .unwrap()
    }

    fn engine(th_start: f64, th_step: f64, max_colors: usize) -> ColoringEngine {
        ColoringEngine::new(ColoringConfig {
            th_start,
            th_step,
            max_colors,
        })
        .unwrap()
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = ColoringConfig {
            th_step: 0.0,
            ..ColoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(SasError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_tiny_step() {
        let config = ColoringConfig {
            th_step: 1e-18,
            ..ColoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(SasError::Configuration(_))));

        let config = ColoringConfig {
            th_step: MIN_TH_STEP,
            ..ColoringConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_levels_saturates() {
        let config = ColoringConfig {
            th_start: 0.0,
            th_step: 1e-18,
            max_colors: 2,
        };
        assert_eq!(config.max_levels(), u32::MAX);

        let config = ColoringConfig {
            th_start: 0.0,
            th_step: 0.25,
            max_colors: 2,
        };
        assert_eq!(config.max_levels(), 5);
    }

    #[test]
    fn test_next_threshold_jumps_to_lowest_weight() {
        let registry = registry(&[("a", 0), ("b", 0), ("c", 0)]);
        let table = table(&[("a", "b", 0.9), ("b", "c", 0.9), ("a", "c", 0.9)]);
        let members = registry.ids();

        let coarse = engine(0.2, 0.1, 2);
        let next = coarse.next_threshold(&members, &table, 0.2).unwrap();
        assert!((next - 0.9).abs() < 1e-9);

        let fine = engine(0.2, MIN_TH_STEP, 2);
        let next = fine.next_threshold(&members, &table, 0.2).unwrap();
        assert!(next >= 0.9 && next < 0.9 + 2.0 * MIN_TH_STEP);
        assert_eq!(fine.next_threshold(&members, &table, 0.95), None);
    }

    #[test]
    fn test_tiny_step_terminates() {
        // Built directly since validation rejects this step.
        let engine = ColoringEngine {
            config: ColoringConfig {
                th_start: 0.2,
                th_step: 1e-18,
                max_colors: 2,
            },
        };
        let registry = registry(&[("a", 0), ("b", 0), ("c", 0)]);
        let table = table(&[("a", "b", 0.9), ("b", "c", 0.9), ("a", "c", 0.9)]);

        let next = engine.next_threshold(&registry.ids(), &table, 0.2).unwrap();
        assert!(next >= 0.9 && next < 0.9 + 1e-9);

        let outcome = engine.color_all(&registry.ids(), &registry, &table).unwrap();
        assert!(outcome.is_satisfied());
        assert_eq!(outcome.components.len(), 3);
        assert_eq!(outcome.max_level(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_channels() {
        let config = ColoringConfig {
            max_colors: 0,
            ..ColoringConfig::default()
        };
        assert!(ColoringEngine::new(config).is_err());
    }

    #[test]
    fn test_max_levels() {
        let config = ColoringConfig {
            th_start: 0.0,
            th_step: 0.3,
            max_colors: 1,
        };
        assert_eq!(config.max_levels(), 5);
    }

    #[test]
    fn test_next_threshold_steps_past_lowest_edge() {
        let table = table(&[("a", "b", 0.45), ("b", "c", 0.9)]);
        let members = registry(&[("a", 0), ("b", 0), ("c", 0)]).ids();
        let engine = engine(0.2, 0.1, 1);

        let next = engine.next_threshold(&members, &table, 0.2).unwrap();
        assert!((next - 0.5).abs() < 1e-9);
        assert_eq!(engine.next_threshold(&members, &table, 0.95), None);
    }

    #[test]
    fn test_escalation_splits_clique() {
        // Triangle in one group needs 3 colors; only 2 are available.
        let registry = registry(&[("a", 0), ("b", 0), ("c", 0)]);
        let table = table(&[("a", "b", 0.3), ("b", "c", 0.8), ("a", "c", 0.8)]);
        let outcome = engine(0.2, 0.1, 2)
            .color_all(&registry.ids(), &registry, &table)
            .unwrap();

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.components.len(), 1);
        let component = &outcome.components[0];
        assert_eq!(component.chromatic, 2);
        assert_eq!(component.level, 1);
        assert!((component.threshold - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_full_threshold_isolates_devices() {
        let registry = registry(&[("a", 0), ("b", 0)]);
        let table = table(&[("a", "b", 1.0)]);
        let engine = engine(0.2, 0.25, 1);
        let outcome = engine.color_all(&registry.ids(), &registry, &table).unwrap();

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.components.len(), 2);
        assert!(outcome.components.iter().all(|c| c.threshold == 1.0 && c.chromatic == 1));
        assert!(outcome.max_level() <= engine.config().max_levels());
    }

    #[test]
    fn test_color_all_at_does_not_escalate() {
        let registry = registry(&[("a", 0), ("b", 0)]);
        let table = table(&[("a", "b", 0.5)]);
        let outcome = engine(0.2, 0.1, 1)
            .color_all_at(&registry.ids(), &registry, &table, 0.3)
            .unwrap();

        assert_eq!(outcome.components.len(), 1);
        assert_eq!(outcome.components[0].level, 0);
        assert!(!outcome.is_satisfied());
    }

    #[test]
    fn test_unknown_device_rejected() {
        let registry = registry(&[("a", 0)]);
        let ids: BTreeSet<DeviceId> = ["a", "b"].into_iter().map(DeviceId::from).collect();
        let err = engine(0.2, 0.1, 1)
            .color_all(&ids, &registry, &table(&[]))
            .unwrap_err();
        assert!(matches!(err, SasError::InconsistentState(_)));
    }
}
