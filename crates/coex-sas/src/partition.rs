//! Connected components of the thresholded interference graph.

use std::collections::{BTreeSet, VecDeque};

use coex_ir::{DeviceId, EdgeWeightTable, InterferenceGraph};

/// A set of devices connected through effective edges.
pub type Component = BTreeSet<DeviceId>;

/// Split `device_ids` into connected components at `threshold`.
///
/// Only edges with weight strictly above `threshold` and both ends in
/// `device_ids` connect devices. Components are discovered from the smallest
/// remaining edge; devices without any effective edge follow as singletons.
/// Every input id lands in exactly one component.
pub fn partition(
    device_ids: &BTreeSet<DeviceId>,
    table: &EdgeWeightTable,
    threshold: f64,
) -> Vec<Component> {
    let graph = InterferenceGraph::induced(table, device_ids, threshold);
    partition_graph(&graph)
}

/// Connected components of an already built graph.
pub fn partition_graph(graph: &InterferenceGraph) -> Vec<Component> {
    let mut edges: BTreeSet<(&DeviceId, &DeviceId)> = graph
        .edges()
        .map(|(a, b, _)| if a <= b { (a, b) } else { (b, a) })
        .collect();
    let mut assigned: BTreeSet<DeviceId> = BTreeSet::new();
    let mut components = Vec::new();

    while let Some((seed, _)) = edges.pop_first() {
        if assigned.contains(seed) {
            continue;
        }
        let component = expand(graph, seed);
        assigned.extend(component.iter().cloned());
        components.push(component);
    }

    for id in graph.ids() {
        if !assigned.contains(id) {
            components.push(BTreeSet::from([id.clone()]));
        }
    }

    components
}

/// Breadth-first expansion from `seed`.
fn expand(graph: &InterferenceGraph, seed: &DeviceId) -> Component {
    let mut component = BTreeSet::from([seed.clone()]);
    let mut queue = VecDeque::from([seed.clone()]);

    while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors(&current) {
            if component.insert(neighbor.clone()) {
                queue.push_back(neighbor.clone());
            }
        }
    }

    component
}
