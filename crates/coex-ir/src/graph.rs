//! Thresholded interference graph.

use std::collections::BTreeSet;

use petgraph::graph::{NodeIndex as PetNodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::device::DeviceId;
use crate::edge::EdgeWeightTable;

/// Node index type for the interference graph.
pub type NodeIndex = PetNodeIndex<u32>;

/// Undirected graph of effective edges over a member set.
///
/// Nodes are inserted in id order, so node indices and iteration order are
/// stable for a given member set. Edges are the table entries with weight
/// strictly above the threshold and both ends in the member set.
#[derive(Debug, Clone)]
pub struct InterferenceGraph {
    graph: UnGraph<DeviceId, f64, u32>,
    index: FxHashMap<DeviceId, NodeIndex>,
    threshold: f64,
}

impl InterferenceGraph {
    /// Build the graph induced by `members` at `threshold`.
    pub fn induced(table: &EdgeWeightTable, members: &BTreeSet<DeviceId>, threshold: f64) -> Self {
        let mut graph = UnGraph::with_capacity(members.len(), 0);
        let mut index = FxHashMap::default();
        for id in members {
            let node = graph.add_node(id.clone());
            index.insert(id.clone(), node);
        }

        for (key, weight) in table.edges_above(threshold) {
            if let (Some(&a), Some(&b)) = (index.get(key.first()), index.get(key.second())) {
                graph.add_edge(a, b, weight);
            }
        }

        Self {
            graph,
            index,
            threshold,
        }
    }

    /// Restrict the graph to `members`.
    ///
    /// Only the edges around `members` are visited, so deriving many small
    /// subgraphs from one graph avoids rescanning the edge table. Ids that
    /// are not part of this graph are ignored.
    pub fn subgraph(&self, members: &BTreeSet<DeviceId>) -> Self {
        let mut graph = UnGraph::with_capacity(members.len(), 0);
        let mut index = FxHashMap::default();
        for id in members.iter().filter(|id| self.contains(id)) {
            let node = graph.add_node(id.clone());
            index.insert(id.clone(), node);
        }

        for id in members {
            let (Some(&old), Some(&a)) = (self.index.get(id), index.get(id)) else {
                continue;
            };
            for edge in self.graph.edges(old) {
                let other = if edge.source() == old {
                    edge.target()
                } else {
                    edge.source()
                };
                let other_id = &self.graph[other];
                // Each edge is added once, from its smaller end.
                if id < other_id {
                    if let Some(&b) = index.get(other_id) {
                        graph.add_edge(a, b, *edge.weight());
                    }
                }
            }
        }

        Self {
            graph,
            index,
            threshold: self.threshold,
        }
    }

    /// Threshold the graph was built at.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of devices.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of effective edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether a device is part of the graph.
    #[inline]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.index.contains_key(id)
    }

    /// Device ids in id order.
    pub fn ids(&self) -> impl Iterator<Item = &DeviceId> + '_ {
        self.graph.node_weights()
    }

    /// Neighbors of a device; empty when the device is unknown.
    pub fn neighbors<'a>(&'a self, id: &DeviceId) -> impl Iterator<Item = &'a DeviceId> + use<'a> {
        let node = self.index.get(id).copied();
        node.into_iter()
            .flat_map(move |n| self.graph.neighbors(n))
            .map(move |n| &self.graph[n])
    }

    /// Number of distinct neighbors of a device.
    pub fn degree(&self, id: &DeviceId) -> usize {
        self.neighbors(id).collect::<BTreeSet<_>>().len()
    }

    /// Whether two devices share an effective edge.
    pub fn is_adjacent(&self, a: &DeviceId, b: &DeviceId) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&x), Some(&y)) => self.graph.find_edge(x, y).is_some(),
            _ => false,
        }
    }

    /// Iterate over effective edges as id pairs with weights.
    pub fn edges(&self) -> impl Iterator<Item = (&DeviceId, &DeviceId, f64)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            let weight = *self.graph.edge_weight(e)?;
            Some((&self.graph[a], &self.graph[b], weight))
        })
    }

    /// Access the underlying petgraph graph.
    pub fn graph(&self) -> &UnGraph<DeviceId, f64, u32> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{Coordination, EdgeKey};

    fn table() -> EdgeWeightTable {
        let entries = [("a", "b", 0.05), ("a", "c", 0.6), ("b", "d", 0.6), ("c", "d", 0.05)];
        EdgeWeightTable::from_weights(
            "test",
            Coordination::Point,
            entries
                .into_iter()
                .map(|(a, b, w)| (EdgeKey::new(a.into(), b.into()).unwrap(), w)),
        )
        .unwrap()
    }

    fn ids(list: &[&str]) -> BTreeSet<DeviceId> {
        list.iter().map(|s| DeviceId::from(*s)).collect()
    }

    #[test]
    fn test_induced_filters_by_threshold() {
        let graph = InterferenceGraph::induced(&table(), &ids(&["a", "b", "c", "d"]), 0.1);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.is_adjacent(&"a".into(), &"c".into()));
        assert!(!graph.is_adjacent(&"a".into(), &"b".into()));
    }

    #[test]
    fn test_induced_filters_by_members() {
        let graph = InterferenceGraph::induced(&table(), &ids(&["a", "b"]), 0.0);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(&"a".into()), 1);
        assert_eq!(graph.degree(&"zz".into()), 0);
        let order: Vec<_> = graph.ids().map(DeviceId::as_str).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_subgraph_matches_induced() {
        let table = table();
        let full = InterferenceGraph::induced(&table, &ids(&["a", "b", "c", "d"]), 0.1);

        let sub = full.subgraph(&ids(&["a", "c", "d", "zz"]));
        let direct = InterferenceGraph::induced(&table, &ids(&["a", "c", "d"]), 0.1);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), direct.edge_count());
        assert!(sub.is_adjacent(&"a".into(), &"c".into()));
        assert!(!sub.contains(&"zz".into()));
        assert_eq!(sub.threshold(), 0.1);

        let isolated = full.subgraph(&ids(&["a", "d"]));
        assert_eq!(isolated.edge_count(), 0);
        assert_eq!(isolated.degree(&"a".into()), 0);
    }
}
