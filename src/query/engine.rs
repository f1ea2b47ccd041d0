//! Bidirectional Dijkstra adapted for Contraction Hierarchies.
//!
//! Two searches run in alternation: forward from the source over
//! outgoing edges, backward from the target over incoming edges. Both
//! only relax edges toward nodes of equal or higher hierarchy level, so
//! each frontier climbs the hierarchy and the searches meet near the
//! top. A shared meeting tracker keeps the best node settled by both
//! sides; the search must not stop at the first meeting — it keeps
//! expanding until no cheaper combined path can remain in the still-open
//! frontiers.
//!
//! Settlement is settle-on-discover: a node's distance is recorded when
//! it is first relaxed and overwritten if a cheaper relaxation arrives
//! later. The meeting checks read these provisional distances, which is
//! what lets a meeting be detected before both sides have popped the
//! node.

use tracing::{debug, info, trace};

use super::frontier::Frontier;
use super::path::{self, Path, RouteEntry};
use super::resolver::{self, Direction};
use crate::error::QueryError;
use crate::graph::{ChGraph, NodeId, Weight};

const UNREACHED: Weight = Weight::MAX;

/// Best node currently settled by both directions, with the combined
/// distance through it. Distance only ever decreases.
#[derive(Debug, Clone, Copy)]
struct MeetingNode {
    node: NodeId,
    distance: Weight,
    /// The node whose expansion produced this meeting; diagnostic only.
    parent: NodeId,
}

impl MeetingNode {
    fn unset() -> Self {
        MeetingNode {
            node: NodeId::MAX,
            distance: UNREACHED,
            parent: NodeId::MAX,
        }
    }

    fn is_found(&self) -> bool {
        self.distance != UNREACHED
    }

    /// Adopt the candidate only if it beats the current best.
    fn offer(&mut self, node: NodeId, distance: Weight, parent: NodeId) -> bool {
        if distance < self.distance {
            self.node = node;
            self.distance = distance;
            self.parent = parent;
            true
        } else {
            false
        }
    }
}

/// Point-to-point query engine over a contracted graph.
///
/// All per-query state (frontiers, meeting tracker) is created fresh in
/// each call, so one engine can serve any number of queries and the
/// graph may be shared read-only across engines.
pub struct BidirectionalDijkstra<'a> {
    graph: &'a ChGraph,
    expanded_forward: usize,
    expanded_backward: usize,
    regular_expansions: usize,
}

impl<'a> BidirectionalDijkstra<'a> {
    pub fn new(graph: &'a ChGraph) -> Self {
        BidirectionalDijkstra {
            graph,
            expanded_forward: 0,
            expanded_backward: 0,
            regular_expansions: 0,
        }
    }

    /// Nodes expanded by the forward search of the most recent query.
    pub fn expanded_forward(&self) -> usize {
        self.expanded_forward
    }

    /// Nodes expanded by the backward search of the most recent query.
    pub fn expanded_backward(&self) -> usize {
        self.expanded_backward
    }

    /// Nodes expanded by the most recent [`execute_regular`] call.
    ///
    /// [`execute_regular`]: BidirectionalDijkstra::execute_regular
    pub fn regular_expansions(&self) -> usize {
        self.regular_expansions
    }

    /// Shortest path from `source` to `target`.
    pub fn execute(&mut self, source: NodeId, target: NodeId) -> Result<Path, QueryError> {
        self.expanded_forward = 0;
        self.expanded_backward = 0;

        if source == target {
            return Ok(Path::trivial(source));
        }

        let mut forward = Frontier::new();
        let mut backward = Frontier::new();
        forward.seed(source);
        backward.seed(target);
        let mut meeting = MeetingNode::unset();

        loop {
            let direction = match (forward.peek_distance(), backward.peek_distance()) {
                (None, None) => break,
                (Some(_), None) => Direction::Forward,
                (None, Some(_)) => Direction::Backward,
                (Some(f), Some(b)) => {
                    if f <= b {
                        Direction::Forward
                    } else {
                        Direction::Backward
                    }
                }
            };

            if self.should_stop(direction, &forward, &backward, &meeting) {
                let parents = path::join_parents(meeting.node, forward.parents(), backward.parents());
                let result = path::construct(source, target, &parents, self.graph);
                info!(
                    source,
                    target,
                    weight = result.total_weight,
                    meeting_node = meeting.node,
                    via = meeting.parent,
                    expanded_forward = self.expanded_forward,
                    expanded_backward = self.expanded_backward,
                    "shortest path found"
                );
                return Ok(result);
            }

            match direction {
                Direction::Forward => {
                    self.expand(&mut forward, &backward, &mut meeting, Direction::Forward);
                }
                Direction::Backward => {
                    self.expand(&mut backward, &forward, &mut meeting, Direction::Backward);
                }
            }
        }

        debug!(source, target, "both frontiers exhausted without meeting");
        Err(QueryError::PathNotFound { source, target })
    }

    /// May the search stop before expanding `direction` this iteration?
    ///
    /// Meeting is not enough: a cheaper combined path could still sit in
    /// the open frontiers. It cannot once the queue top of the direction
    /// about to expand reaches the best meeting distance — alternation
    /// picks the smaller top, so any better apex would by then have been
    /// popped by both sides and already be the tracked meeting node.
    fn should_stop(
        &self,
        direction: Direction,
        forward: &Frontier,
        backward: &Frontier,
        meeting: &MeetingNode,
    ) -> bool {
        if !meeting.is_found() {
            return false;
        }
        let own = match direction {
            Direction::Forward => forward,
            Direction::Backward => backward,
        };
        match own.peek_distance() {
            Some(own_top) => own_top >= meeting.distance,
            None => false,
        }
    }

    /// Pop the cheapest node of `own` and relax its CH-upward
    /// neighborhood, updating the meeting tracker against `other`.
    fn expand(
        &mut self,
        own: &mut Frontier,
        other: &Frontier,
        meeting: &mut MeetingNode,
        direction: Direction,
    ) {
        let Some((node, distance)) = own.pop() else {
            return;
        };
        match direction {
            Direction::Forward => self.expanded_forward += 1,
            Direction::Backward => self.expanded_backward += 1,
        }
        debug!(node, distance, ?direction, "expanding node");

        // The popped node itself may close the gap to the other side.
        if let Some(opposite) = other.settled_distance(node) {
            if meeting.offer(node, distance.saturating_add(opposite), node) {
                trace!(node, distance = meeting.distance, "meeting improved");
            }
        }

        let neighbors = match direction {
            Direction::Forward => self.graph.outgoing_neighborhood(node),
            Direction::Backward => self.graph.incoming_neighborhood(node),
        };
        let level = self.graph.level(node);

        for (&neighbor, &weight) in &neighbors {
            if self.graph.level(neighbor) < level {
                trace!(node = neighbor, "below current level, ignored");
                continue;
            }
            let tentative = distance.saturating_add(weight);

            match own.settled_distance(neighbor) {
                None => {
                    let edge = resolver::resolve(self.graph, node, neighbor, weight, direction);
                    own.push(neighbor, tentative, RouteEntry::via(node, weight, &edge));
                }
                Some(settled) if tentative < settled => {
                    let edge = resolver::resolve(self.graph, node, neighbor, weight, direction);
                    own.push(neighbor, tentative, RouteEntry::via(node, weight, &edge));
                }
                Some(_) => {}
            }

            if let Some(opposite) = other.settled_distance(neighbor) {
                let combined = distance.saturating_add(weight).saturating_add(opposite);
                if meeting.offer(neighbor, combined, node) {
                    trace!(node = neighbor, distance = meeting.distance, "meeting improved");
                }
            }
        }
    }

    /// Plain forward Dijkstra to one target, still restricted to
    /// CH-upward edges. A comparison and benchmarking aid; on a
    /// contracted graph it only finds paths that climb the hierarchy,
    /// so it carries none of the bidirectional query's correctness
    /// guarantees.
    pub fn execute_regular(&mut self, source: NodeId, target: NodeId) -> Result<Path, QueryError> {
        self.regular_expansions = 0;

        if source == target {
            return Ok(Path::trivial(source));
        }

        let mut forward = Frontier::new();
        forward.seed(source);

        while let Some((node, distance)) = forward.pop() {
            if node == target {
                let result = path::construct(source, target, forward.parents(), self.graph);
                info!(
                    source,
                    target,
                    weight = result.total_weight,
                    expansions = self.regular_expansions,
                    "regular search finished"
                );
                return Ok(result);
            }
            self.regular_expansions += 1;

            let level = self.graph.level(node);
            for (&neighbor, &weight) in &self.graph.outgoing_neighborhood(node) {
                if self.graph.level(neighbor) < level {
                    continue;
                }
                let tentative = distance.saturating_add(weight);
                let improves = match forward.settled_distance(neighbor) {
                    None => true,
                    Some(settled) => tentative < settled,
                };
                if improves {
                    let edge =
                        resolver::resolve(self.graph, node, neighbor, weight, Direction::Forward);
                    forward.push(neighbor, tentative, RouteEntry::via(node, weight, &edge));
                }
            }
        }

        Err(QueryError::PathNotFound { source, target })
    }

    /// Run the bidirectional query from `source` to every other node,
    /// reporting found/not-found per target. Unreachable targets are a
    /// normal outcome here, never a failure of the batch.
    pub fn execute_to_all(&mut self, source: NodeId) {
        for target in 0..self.graph.node_count() as NodeId {
            if target == source {
                continue;
            }
            match self.execute(source, target) {
                Ok(result) => {
                    info!(source, target, weight = result.total_weight, "path found");
                }
                Err(QueryError::PathNotFound { .. }) => {
                    info!(source, target, "path not found");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_meeting_node_only_improves() {
        let mut meeting = MeetingNode::unset();
        assert!(!meeting.is_found());

        assert!(meeting.offer(4, 15, 0));
        assert!(meeting.is_found());
        assert_eq!((meeting.node, meeting.distance), (4, 15));

        // Worse and equal candidates are rejected.
        assert!(!meeting.offer(7, 20, 0));
        assert!(!meeting.offer(7, 15, 0));
        assert_eq!(meeting.node, 4);

        assert!(meeting.offer(2, 10, 0));
        assert_eq!((meeting.node, meeting.distance, meeting.parent), (2, 10, 0));
    }

    #[test]
    fn test_demo_query_meets_in_the_middle() {
        let graph = ChGraph::demo();
        let mut engine = BidirectionalDijkstra::new(&graph);

        let path = engine.execute(0, 4).unwrap();
        assert_eq!(path.total_weight, 10);
        assert_eq!(path.nodes, vec![0, 2, 4]);
        // Both shortcut legs, no labels.
        assert!(path.legs.iter().all(|leg| leg.label.is_none()));
    }

    #[test]
    fn test_counters_reset_between_queries() {
        let graph = ChGraph::demo();
        let mut engine = BidirectionalDijkstra::new(&graph);

        engine.execute(0, 4).unwrap();
        let first = (engine.expanded_forward(), engine.expanded_backward());
        assert!(first.0 > 0 && first.1 > 0);

        engine.execute(4, 4).unwrap();
        assert_eq!(engine.expanded_forward(), 0);
        assert_eq!(engine.expanded_backward(), 0);
    }

    #[test]
    fn test_disconnected_pair_is_not_found() {
        let mut builder = GraphBuilder::new();
        builder.add_node(0);
        builder.add_node(1);
        builder.add_node(0);
        builder.add_edge(0, 1, 2, None);
        builder.add_edge(1, 0, 2, None);
        let graph = builder.build();

        let mut engine = BidirectionalDijkstra::new(&graph);
        assert_eq!(
            engine.execute(0, 2),
            Err(QueryError::PathNotFound {
                source: 0,
                target: 2
            })
        );
    }

    #[test]
    fn test_regular_search_climbs_to_target() {
        // 0 (level 0) -> 1 (level 1) -> 2 (level 2): strictly upward, so
        // the regular search can reach the target.
        let mut builder = GraphBuilder::new();
        builder.add_node(0);
        builder.add_node(1);
        builder.add_node(2);
        builder.add_edge(0, 1, 4, None);
        builder.add_edge(1, 2, 6, None);
        let graph = builder.build();

        let mut engine = BidirectionalDijkstra::new(&graph);
        let path = engine.execute_regular(0, 2).unwrap();
        assert_eq!(path.total_weight, 10);
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(engine.regular_expansions(), 2);
    }
}
