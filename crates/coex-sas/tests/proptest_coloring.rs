//! Property-based tests for partitioning, coloring and channel assignment.

use std::collections::{BTreeMap, BTreeSet};

use coex_ir::{
    Category, Coordination, Device, DeviceId, DeviceRegistry, EdgeKey, EdgeWeightTable,
    InterferenceGraph, Location,
};
use coex_sas::{
    ColoringConfig, ColoringEngine, MIN_TH_STEP, assign_channels, color_component, estimate_all,
    partition,
};
use proptest::prelude::*;

const CHANNELS: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Random scenario: device groups plus weighted pairs over up to 12 devices.
fn arb_scenario() -> impl Strategy<Value = (Vec<u32>, Vec<(usize, usize, f64)>)> {
    (2_usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(0_u32..3, n),
            prop::collection::vec((0..n, 0..n, 0.0_f64..=1.0), 0..40),
        )
    })
}

fn build((groups, weights): &(Vec<u32>, Vec<(usize, usize, f64)>)) -> (DeviceRegistry, EdgeWeightTable) {
    let registry = DeviceRegistry::from_devices(groups.iter().enumerate().map(|(i, g)| {
        Device::new(i, Location::new(36.8, -76.0), 6.0, Category::A, 26.0).with_coex_group(*g)
    }))
    .unwrap();
    let mut table = EdgeWeightTable::new("test", Coordination::Point);
    for (a, b, w) in weights {
        if a != b {
            table
                .insert(EdgeKey::new((*a).into(), (*b).into()).unwrap(), *w)
                .unwrap();
        }
    }
    (registry, table)
}

proptest! {
    #[test]
    fn partition_is_complete_and_closed(scenario in arb_scenario(), threshold in 0.0_f64..1.0) {
        let (registry, table) = build(&scenario);
        let ids = registry.ids();
        let components = partition(&ids, &table, threshold);

        let mut seen = BTreeSet::new();
        for component in &components {
            for id in component {
                prop_assert!(seen.insert(id.clone()), "device {} in two components", id);
            }
        }
        prop_assert_eq!(&seen, &ids);

        let owner: BTreeMap<&DeviceId, usize> = components
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.iter().map(move |id| (id, i)))
            .collect();
        for (key, _) in table.edges_above(threshold) {
            prop_assert_eq!(owner[key.first()], owner[key.second()]);
        }
    }

    #[test]
    fn coloring_is_valid_and_additive(scenario in arb_scenario(), threshold in 0.0_f64..1.0) {
        let (registry, table) = build(&scenario);
        for members in partition(&registry.ids(), &table, threshold) {
            let colored = color_component(&members, &registry, &table, threshold).unwrap();
            prop_assert_eq!(colored.members(), members.clone());
            prop_assert!(colored.colors.values().all(|c| *c >= 1));

            let mut per_group: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
            for (id, color) in &colored.colors {
                per_group.entry(registry.coex_group(id).unwrap()).or_default().insert(*color);
            }

            // Adjacent members of one group never share a color.
            for (key, _) in table.edges_above(threshold) {
                let (a, b) = (key.first(), key.second());
                if members.contains(a) && members.contains(b)
                    && registry.coex_group(a) == registry.coex_group(b)
                {
                    prop_assert_ne!(colored.colors[a], colored.colors[b]);
                }
            }

            // Groups use disjoint color ranges and the chromatic number adds up.
            let total: usize = per_group.values().map(BTreeSet::len).sum();
            prop_assert_eq!(colored.chromatic, total);
            let union: BTreeSet<u32> = per_group.values().flatten().copied().collect();
            prop_assert_eq!(union.len(), total);
            prop_assert_eq!(union.iter().max().copied().unwrap_or(0) as usize, total);
        }
    }

    #[test]
    fn escalation_is_bounded_and_complete(
        scenario in arb_scenario(),
        th_start in 0.0_f64..0.5,
        th_step in prop_oneof![Just(MIN_TH_STEP), 0.001_f64..0.5],
    ) {
        let (registry, table) = build(&scenario);
        let config = ColoringConfig { th_start, th_step, max_colors: 2 };
        let engine = ColoringEngine::new(config).unwrap();
        let outcome = engine.color_all(&registry.ids(), &registry, &table).unwrap();

        prop_assert!(outcome.max_level() <= config.max_levels());
        prop_assert_eq!(outcome.device_count(), registry.len());
        prop_assert!(outcome.components.iter().all(|c| c.threshold <= 1.0));
    }

    #[test]
    fn channels_are_conserved(scenario in arb_scenario(), partial in any::<bool>()) {
        let (mut registry, table) = build(&scenario);
        let engine = ColoringEngine::new(ColoringConfig::default()).unwrap();
        let outcome = engine.color_all(&registry.ids(), &registry, &table).unwrap();
        assign_channels(&mut registry, &outcome.components, &CHANNELS, partial).unwrap();

        for component in &outcome.components {
            let mut by_color: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
            for id in component.colors.keys() {
                let device = registry.get(id).unwrap();
                prop_assert!(device.channels.iter().all(|ch| CHANNELS.contains(ch)));
                by_color.entry(device.color).or_insert_with(|| device.channels.clone());
                prop_assert_eq!(&by_color[&device.color], &device.channels);
            }
            let blocks: Vec<&BTreeSet<u32>> = by_color.values().collect();
            for (i, a) in blocks.iter().enumerate() {
                for b in &blocks[i + 1..] {
                    prop_assert!(a.is_disjoint(b));
                }
            }
        }
    }

    #[test]
    fn cluster_size_is_one_without_effective_edges(scenario in arb_scenario(), threshold in 0.0_f64..1.0) {
        let (registry, table) = build(&scenario);
        let effective = InterferenceGraph::induced(&table, &registry.ids(), threshold);
        let estimates = estimate_all(&registry, &table, threshold).unwrap();
        prop_assert_eq!(estimates.len(), registry.len());
        for (id, estimate) in &estimates {
            prop_assert!(estimate.cluster_size >= 1);
            if effective.degree(id) == 0 {
                prop_assert_eq!(estimate.cluster_size, 1, "isolated device {}", id);
            }
            let group = registry.coex_group(id);
            prop_assert!(estimate.potential_neighbors.iter().all(|n| registry.coex_group(n) != group));
        }
    }
}
