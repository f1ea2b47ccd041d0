//! Edge identity reconstruction for relaxations.
//!
//! The neighborhood maps only say "neighbor v at weight w"; the path
//! needs the concrete edge. Forward relaxations scan the outgoing edge
//! list of the expanded node. Backward relaxations conceptually traverse
//! a stored edge against its direction, so the matching incoming edge is
//! re-oriented before it is recorded.

use crate::graph::{ChGraph, Edge, NodeId, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Find the edge used by a relaxation from `from` to `to` at `weight`.
///
/// Among equal-weight parallel edges the first match in the graph's
/// edge-iteration order wins. A miss means the adjacency and edge table
/// disagree, which is a precondition violation of the graph store, not a
/// query outcome.
pub fn resolve(
    graph: &ChGraph,
    from: NodeId,
    to: NodeId,
    weight: Weight,
    direction: Direction,
) -> Edge {
    match direction {
        Direction::Forward => {
            for &id in graph.out_edge_ids(from) {
                let edge = graph.edge(id);
                if edge.to == to && edge.weight == weight {
                    return edge.clone();
                }
            }
        }
        Direction::Backward => {
            for &id in graph.in_edge_ids(from) {
                let edge = graph.edge(id);
                if edge.from == to && edge.weight == weight {
                    let mut reversed = edge.clone();
                    reversed.from = from;
                    reversed.to = to;
                    return reversed;
                }
            }
        }
    }
    panic!(
        "graph inconsistency: no {} edge {} -> {} with weight {}",
        match direction {
            Direction::Forward => "outgoing",
            Direction::Backward => "incoming",
        },
        from,
        to,
        weight
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn fixture() -> ChGraph {
        let mut builder = GraphBuilder::new();
        builder.add_node(0);
        builder.add_node(0);
        builder.add_node(0);
        builder.add_edge(0, 1, 3, Some("first".to_owned()));
        builder.add_edge(0, 1, 3, Some("second".to_owned()));
        builder.add_edge(0, 1, 8, Some("slow".to_owned()));
        builder.add_edge(1, 2, 5, Some("onward".to_owned()));
        builder.build()
    }

    #[test]
    fn test_forward_matches_target_and_weight() {
        let graph = fixture();
        let edge = resolve(&graph, 0, 1, 8, Direction::Forward);
        assert_eq!(edge.id, 2);
        assert_eq!((edge.from, edge.to), (0, 1));
    }

    #[test]
    fn test_forward_first_match_wins_among_parallels() {
        let graph = fixture();
        let edge = resolve(&graph, 0, 1, 3, Direction::Forward);
        assert_eq!(edge.id, 0);
        assert_eq!(edge.label.as_deref(), Some("first"));
    }

    #[test]
    fn test_backward_reorients_stored_edge() {
        let graph = fixture();
        // Backward search expanding node 2 relaxed neighbor 1 over the
        // stored edge 1 -> 2; the record must read 2 -> 1.
        let edge = resolve(&graph, 2, 1, 5, Direction::Backward);
        assert_eq!(edge.id, 3);
        assert_eq!((edge.from, edge.to), (2, 1));
        assert_eq!(edge.weight, 5);
        assert_eq!(edge.label.as_deref(), Some("onward"));
    }

    #[test]
    #[should_panic(expected = "graph inconsistency")]
    fn test_missing_edge_is_fatal() {
        let graph = fixture();
        resolve(&graph, 0, 1, 4, Direction::Forward);
    }
}
