//! Route entries and path materialization.
//!
//! Each settled node remembers how it was reached via a [`RouteEntry`].
//! After the two searches meet, the backward chain is re-oriented and
//! merged into the forward chain so the whole path reads source to
//! target, then the merged map is walked once to build the final
//! node/edge sequence.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::graph::{ChGraph, Edge, EdgeId, NodeId, Weight};

/// How a settled node was reached in its direction. The search roots
/// (source and target) carry no parent and no edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub parent: Option<NodeId>,
    pub cost: Weight,
    pub edge: Option<EdgeId>,
    pub label: Option<String>,
}

impl RouteEntry {
    pub fn root() -> Self {
        RouteEntry {
            parent: None,
            cost: 0,
            edge: None,
            label: None,
        }
    }

    pub fn via(parent: NodeId, cost: Weight, edge: &Edge) -> Self {
        RouteEntry {
            parent: Some(parent),
            cost,
            edge: Some(edge.id),
            label: edge.label.clone(),
        }
    }
}

/// One edge traversal along the final path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathLeg {
    pub from: NodeId,
    pub to: NodeId,
    pub edge: EdgeId,
    pub weight: Weight,
    pub label: Option<String>,
}

/// Ordered node/edge sequence from source to target. Immutable once
/// built; a query for `source == target` yields the zero-length path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub legs: Vec<PathLeg>,
    pub total_weight: Weight,
}

impl Path {
    pub(crate) fn trivial(node: NodeId) -> Self {
        Path {
            nodes: vec![node],
            legs: Vec::new(),
            total_weight: 0,
        }
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeId {
        *self.nodes.last().unwrap_or(&self.nodes[0])
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes[0])?;
        for leg in &self.legs {
            match &leg.label {
                Some(label) => write!(f, " -({}, {})-> {}", leg.weight, label, leg.to)?,
                None => write!(f, " -({})-> {}", leg.weight, leg.to)?,
            }
        }
        write!(f, " | total weight {}", self.total_weight)
    }
}

/// Merge the two parent chains around the meeting node into one map
/// oriented source to target.
///
/// The forward chain is taken as recorded. Backward entries point away
/// from the target, so each one is flipped: the edge that reached
/// `entry.parent` from `node` becomes `entry.parent`'s route entry with
/// `node` as its parent.
pub(crate) fn join_parents(
    meeting: NodeId,
    forward: &FxHashMap<NodeId, RouteEntry>,
    backward: &FxHashMap<NodeId, RouteEntry>,
) -> FxHashMap<NodeId, RouteEntry> {
    let mut merged = FxHashMap::default();

    let mut current = meeting;
    while let Some(entry) = forward.get(&current) {
        merged.insert(current, entry.clone());
        match entry.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }

    current = meeting;
    while let Some(entry) = backward.get(&current) {
        let Some(next) = entry.parent else { break };
        merged.insert(
            next,
            RouteEntry {
                parent: Some(current),
                cost: entry.cost,
                edge: entry.edge,
                label: entry.label.clone(),
            },
        );
        current = next;
    }

    merged
}

/// Walk the merged parent map from target back to source and emit the
/// ordered leg sequence, pulling edge labels from the graph.
pub(crate) fn construct(
    source: NodeId,
    target: NodeId,
    parents: &FxHashMap<NodeId, RouteEntry>,
    graph: &ChGraph,
) -> Path {
    let mut legs = Vec::new();
    let mut current = target;

    while current != source {
        let Some(entry) = parents.get(&current) else {
            panic!("parent chain broken at node {current} while materializing path");
        };
        let (Some(parent), Some(edge_id)) = (entry.parent, entry.edge) else {
            panic!("root route entry reached at node {current} before the source");
        };
        legs.push(PathLeg {
            from: parent,
            to: current,
            edge: edge_id,
            weight: entry.cost,
            label: graph.edge(edge_id).label.clone(),
        });
        current = parent;
    }
    legs.reverse();

    let mut nodes = vec![source];
    nodes.extend(legs.iter().map(|leg| leg.to));
    let total_weight = legs
        .iter()
        .fold(0u32, |acc, leg| acc.saturating_add(leg.weight));

    Path {
        nodes,
        legs,
        total_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    /// Line graph 0 -> 1 -> 2 -> 3 with unit levels, forward search met
    /// backward search at node 1.
    fn line_fixture() -> (ChGraph, FxHashMap<NodeId, RouteEntry>, FxHashMap<NodeId, RouteEntry>) {
        let mut builder = GraphBuilder::new();
        for _ in 0..4 {
            builder.add_node(0);
        }
        builder.add_edge(0, 1, 2, Some("a".to_owned()));
        builder.add_edge(1, 2, 3, Some("b".to_owned()));
        builder.add_edge(2, 3, 4, Some("c".to_owned()));
        let graph = builder.build();

        let mut forward = FxHashMap::default();
        forward.insert(0, RouteEntry::root());
        forward.insert(1, RouteEntry::via(0, 2, graph.edge(0)));

        // Backward entries walk 3 -> 2 -> 1, each pointing at the node
        // closer to the target.
        let mut backward = FxHashMap::default();
        backward.insert(3, RouteEntry::root());
        backward.insert(2, RouteEntry::via(3, 4, graph.edge(2)));
        backward.insert(1, RouteEntry::via(2, 3, graph.edge(1)));

        (graph, forward, backward)
    }

    #[test]
    fn test_join_reorients_backward_chain() {
        let (_, forward, backward) = line_fixture();
        let merged = join_parents(1, &forward, &backward);

        assert_eq!(merged[&0], RouteEntry::root());
        assert_eq!(merged[&1].parent, Some(0));
        assert_eq!(merged[&2].parent, Some(1));
        assert_eq!(merged[&3].parent, Some(2));
        // The flipped entries keep their edge identity and cost.
        assert_eq!(merged[&2].edge, Some(1));
        assert_eq!(merged[&3].cost, 4);
    }

    #[test]
    fn test_construct_orders_source_to_target() {
        let (graph, forward, backward) = line_fixture();
        let merged = join_parents(1, &forward, &backward);
        let path = construct(0, 3, &merged, &graph);

        assert_eq!(path.nodes, vec![0, 1, 2, 3]);
        assert_eq!(path.total_weight, 9);
        assert_eq!(path.legs.len(), 3);
        assert_eq!(path.legs[1].label.as_deref(), Some("b"));
        assert_eq!(path.source(), 0);
        assert_eq!(path.target(), 3);
    }

    #[test]
    fn test_trivial_path_is_zero_length() {
        let path = Path::trivial(7);
        assert_eq!(path.nodes, vec![7]);
        assert!(path.legs.is_empty());
        assert_eq!(path.total_weight, 0);
        assert_eq!(path.source(), 7);
        assert_eq!(path.target(), 7);
    }

    #[test]
    fn test_display_shows_legs_and_total() {
        let (graph, forward, backward) = line_fixture();
        let merged = join_parents(1, &forward, &backward);
        let path = construct(0, 3, &merged, &graph);
        assert_eq!(
            path.to_string(),
            "0 -(2, a)-> 1 -(3, b)-> 2 -(4, c)-> 3 | total weight 9"
        );
    }
}
