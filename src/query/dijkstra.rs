//! Unrestricted reference Dijkstra.
//!
//! Ignores hierarchy levels entirely and relaxes every outgoing edge, so
//! its distances are ground truth for any graph. The `validate` command
//! and the property tests compare the bidirectional engine against it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::graph::{ChGraph, NodeId, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchState {
    node: NodeId,
    cost: Weight,
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap; node id as tie breaker.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Weight of the shortest path from `source` to `target`, or `None` when
/// no path exists.
pub fn shortest_path_weight(graph: &ChGraph, source: NodeId, target: NodeId) -> Option<Weight> {
    if source == target {
        return Some(0);
    }

    let mut dist: FxHashMap<NodeId, Weight> = FxHashMap::default();
    let mut heap = BinaryHeap::new();
    dist.insert(source, 0);
    heap.push(SearchState {
        node: source,
        cost: 0,
    });

    while let Some(SearchState { node, cost }) = heap.pop() {
        if cost > *dist.get(&node).unwrap_or(&Weight::MAX) {
            continue; // stale entry
        }
        if node == target {
            return Some(cost);
        }
        for (&neighbor, &weight) in &graph.outgoing_neighborhood(node) {
            let next = cost.saturating_add(weight);
            if next < *dist.get(&neighbor).unwrap_or(&Weight::MAX) {
                dist.insert(neighbor, next);
                heap.push(SearchState {
                    node: neighbor,
                    cost: next,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_ignores_levels() {
        // Downhill edge 1 -> 0 that the CH rule would forbid.
        let mut builder = GraphBuilder::new();
        builder.add_node(0);
        builder.add_node(9);
        builder.add_node(0);
        builder.add_edge(1, 0, 2, None);
        builder.add_edge(0, 2, 3, None);
        let graph = builder.build();

        assert_eq!(shortest_path_weight(&graph, 1, 2), Some(5));
    }

    #[test]
    fn test_demo_distances() {
        let graph = ChGraph::demo();
        assert_eq!(shortest_path_weight(&graph, 0, 4), Some(10));
        assert_eq!(shortest_path_weight(&graph, 0, 3), Some(9));
        assert_eq!(shortest_path_weight(&graph, 2, 2), Some(0));
    }

    #[test]
    fn test_unreachable_is_none() {
        let mut builder = GraphBuilder::new();
        builder.add_node(0);
        builder.add_node(0);
        let graph = builder.build();
        assert_eq!(shortest_path_weight(&graph, 0, 1), None);
    }
}
