//! Greedy coloring of one component.
//!
//! A component is split by coexistence group. Each group is colored on its
//! own, using only the edges between its members, and the groups' color
//! ranges are then laid end to end starting at 1. Color 0 stays reserved
//! for "unassigned".

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use coex_ir::{DeviceId, DeviceRegistry, EdgeWeightTable, InterferenceGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SasError, SasResult};

/// A component together with its coloring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredComponent {
    /// Threshold the component was formed and colored at.
    pub threshold: f64,
    /// Color of each member, starting at 1.
    pub colors: BTreeMap<DeviceId, u32>,
    /// Sum of the distinct colors used by each coexistence group.
    pub chromatic: usize,
    /// Number of threshold escalations that led to this component.
    #[serde(default)]
    pub level: u32,
}

impl ColoredComponent {
    /// Member ids.
    pub fn members(&self) -> BTreeSet<DeviceId> {
        self.colors.keys().cloned().collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the component has no members.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether the coloring fits into `max_colors` channels.
    pub fn is_satisfied(&self, max_colors: usize) -> bool {
        self.chromatic <= max_colors
    }

    /// Smallest member id, used to order components.
    pub fn first_member(&self) -> Option<&DeviceId> {
        self.colors.keys().next()
    }
}

/// Welsh–Powell coloring of a graph, colors starting at 0.
///
/// Vertices are visited by descending degree; equal degrees are visited in
/// id order. Each vertex takes the smallest color none of its already
/// colored neighbors uses.
pub fn welsh_powell(graph: &InterferenceGraph) -> BTreeMap<DeviceId, u32> {
    let mut order: Vec<(&DeviceId, usize)> = graph.ids().map(|id| (id, graph.degree(id))).collect();
    // Stable sort keeps id order among equal degrees.
    order.sort_by_key(|(_, degree)| Reverse(*degree));

    let mut colors: BTreeMap<DeviceId, u32> = BTreeMap::new();
    for (id, _) in order {
        let used: BTreeSet<u32> = graph
            .neighbors(id)
            .filter_map(|n| colors.get(n).copied())
            .collect();
        let color = (0..).find(|c| !used.contains(c)).unwrap_or(0);
        colors.insert(id.clone(), color);
    }
    colors
}

/// Members of a component grouped by coexistence group, in group order.
pub fn split_by_group(
    members: &BTreeSet<DeviceId>,
    registry: &DeviceRegistry,
) -> SasResult<BTreeMap<u32, BTreeSet<DeviceId>>> {
    let mut groups: BTreeMap<u32, BTreeSet<DeviceId>> = BTreeMap::new();
    for id in members {
        let group = registry.coex_group(id).ok_or_else(|| {
            SasError::InconsistentState(format!("component member '{id}' is not a known device"))
        })?;
        groups.entry(group).or_default().insert(id.clone());
    }
    Ok(groups)
}

/// Color one component at `threshold`.
pub fn color_component(
    members: &BTreeSet<DeviceId>,
    registry: &DeviceRegistry,
    table: &EdgeWeightTable,
    threshold: f64,
) -> SasResult<ColoredComponent> {
    let graph = InterferenceGraph::induced(table, members, threshold);
    color_component_in(&graph, members, registry)
}

/// Color one component using an already built graph.
///
/// `graph` must contain the effective edges between `members`; it may span
/// more devices, such as the whole partition the component came from. The
/// component is colored at the graph's threshold.
pub fn color_component_in(
    graph: &InterferenceGraph,
    members: &BTreeSet<DeviceId>,
    registry: &DeviceRegistry,
) -> SasResult<ColoredComponent> {
    let threshold = graph.threshold();
    let groups: Vec<(u32, BTreeSet<DeviceId>)> =
        split_by_group(members, registry)?.into_iter().collect();

    let local: Vec<(u32, BTreeMap<DeviceId, u32>)> = groups
        .par_iter()
        .map(|(group, ids)| (*group, welsh_powell(&graph.subgraph(ids))))
        .collect();

    let mut colors = BTreeMap::new();
    let mut chromatic = 0;
    let mut start = 1;
    for (group, group_colors) in local {
        let distinct: BTreeSet<u32> = group_colors.values().copied().collect();
        chromatic += distinct.len();
        debug!("Group {} uses {} colors from {}", group, distinct.len(), start);

        let mut highest = start;
        for (id, color) in group_colors {
            let shifted = color + start;
            highest = highest.max(shifted);
            colors.insert(id, shifted);
        }
        start = highest + 1;
    }

    Ok(ColoredComponent {
        threshold,
        colors,
        chromatic,
        level: 0,
    })
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

    fn ids(list: &[&str]) -> BTreeSet<DeviceId> {
        list.iter().map(|s| DeviceId::from(*s)).collect()
    }

    #[test]
    fn test_welsh_powell_triangle() {
        let table = table(&[("a", "b", 0.5), ("b", "c", 0.5), ("a", "c", 0.5)]);
        let graph = InterferenceGraph::induced(&table, &ids(&["a", "b", "c"]), 0.1);
        let colors = welsh_powell(&graph);
        assert_eq!(colors[&"a".into()], 0);
        assert_eq!(colors[&"b".into()], 1);
        assert_eq!(colors[&"c".into()], 2);
    }

    #[test]
    fn test_welsh_powell_highest_degree_first() {
        // Star centred on "z": the centre is visited first despite its id.
        let table = table(&[("z", "a", 0.5), ("z", "b", 0.5), ("z", "c", 0.5)]);
        let graph = InterferenceGraph::induced(&table, &ids(&["a", "b", "c", "z"]), 0.1);
        let colors = welsh_powell(&graph);
        assert_eq!(colors[&"z".into()], 0);
        assert!(["a", "b", "c"].iter().all(|id| colors[&DeviceId::from(*id)] == 1));
    }

    #[test]
    fn test_welsh_powell_isolated_vertices_share_color() {
        let table = table(&[]);
        let graph = InterferenceGraph::induced(&table, &ids(&["a", "b"]), 0.1);
        assert!(welsh_powell(&graph).values().all(|c| *c == 0));
    }

    #[test]
    fn test_component_from_example() {
        let registry = registry(&[("A", 1), ("B", 1), ("C", 2), ("D", 2)]);
        let table = table(&[("A", "B", 0.05), ("A", "C", 0.6), ("B", "D", 0.6), ("C", "D", 0.05)]);

        let colored = color_component(&ids(&["A", "C"]), &registry, &table, 0.1).unwrap();
        assert_eq!(colored.chromatic, 2);
        assert_eq!(colored.colors[&"A".into()], 1);
        assert_eq!(colored.colors[&"C".into()], 2);
    }

    #[test]
    fn test_groups_are_offset() {
        let registry = registry(&[("a", 0), ("b", 0), ("c", 5), ("d", 5), ("e", 5)]);
        let table = table(&[
            ("a", "b", 0.9),
            ("c", "d", 0.9),
            ("d", "e", 0.9),
            ("c", "e", 0.9),
            ("a", "c", 0.9),
        ]);

        let colored =
            color_component(&ids(&["a", "b", "c", "d", "e"]), &registry, &table, 0.1).unwrap();
        assert_eq!(colored.chromatic, 2 + 3);
        let group0: BTreeSet<u32> = ["a", "b"].iter().map(|id| colored.colors[&DeviceId::from(*id)]).collect();
        let group5: BTreeSet<u32> =
            ["c", "d", "e"].iter().map(|id| colored.colors[&DeviceId::from(*id)]).collect();
        assert_eq!(group0, BTreeSet::from([1, 2]));
        assert_eq!(group5, BTreeSet::from([3, 4, 5]));
    }

    #[test]
    fn test_shared_graph_matches_table_coloring() {
        let registry = registry(&[("a", 0), ("b", 0), ("c", 1), ("d", 1), ("e", 0)]);
        let table = table(&[
            ("a", "b", 0.9),
            ("a", "c", 0.9),
            ("c", "d", 0.9),
            ("d", "e", 0.05),
        ]);
        let all = ids(&["a", "b", "c", "d", "e"]);
        let graph = InterferenceGraph::induced(&table, &all, 0.1);

        let members = ids(&["a", "b", "c", "d"]);
        let shared = color_component_in(&graph, &members, &registry).unwrap();
        let direct = color_component(&members, &registry, &table, 0.1).unwrap();
        assert_eq!(shared, direct);
        assert_eq!(shared.chromatic, 4);

        let single = color_component_in(&graph, &ids(&["e"]), &registry).unwrap();
        assert_eq!(single.chromatic, 1);
        assert_eq!(single.threshold, 0.1);
    }

    #[test]
    fn test_unknown_member_is_inconsistent() {
        let registry = registry(&[("a", 0)]);
        let err = color_component(&ids(&["a", "ghost"]), &registry, &table(&[]), 0.1).unwrap_err();
        assert!(matches!(err, SasError::InconsistentState(_)));
    }
}
