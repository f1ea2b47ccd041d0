//! Per-direction search state: queue, settled map, parent map.

use std::cmp::Reverse;

use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;

use super::path::RouteEntry;
use crate::graph::{NodeId, Weight};

/// One direction's frontier. Owned exclusively by that direction; the
/// opposite search only ever reads it through the accessors.
///
/// Settlement here follows the settle-on-discover policy: a node's
/// distance is written the moment it is first relaxed, not when it is
/// popped, and overwritten whenever a cheaper relaxation shows up. The
/// meeting check relies on reading these provisional distances.
pub struct Frontier {
    queue: PriorityQueue<NodeId, Reverse<Weight>>,
    settled: FxHashMap<NodeId, Weight>,
    parents: FxHashMap<NodeId, RouteEntry>,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    pub fn new() -> Self {
        Frontier {
            queue: PriorityQueue::new(),
            settled: FxHashMap::default(),
            parents: FxHashMap::default(),
        }
    }

    /// Seed the search root: queued at distance zero with a parentless
    /// route entry, but not yet settled.
    pub fn seed(&mut self, root: NodeId) {
        self.queue.push(root, Reverse(0));
        self.parents.insert(root, RouteEntry::root());
    }

    /// Insert or decrease-key `node` and record its provisional
    /// settlement and parent.
    pub fn push(&mut self, node: NodeId, distance: Weight, entry: RouteEntry) {
        self.queue.push(node, Reverse(distance));
        self.settled.insert(node, distance);
        self.parents.insert(node, entry);
    }

    /// Remove and return the minimum entry, marking it settled.
    pub fn pop(&mut self) -> Option<(NodeId, Weight)> {
        let (node, Reverse(distance)) = self.queue.pop()?;
        self.settled.insert(node, distance);
        Some((node, distance))
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn peek_distance(&self) -> Option<Weight> {
        self.queue.peek().map(|(_, &Reverse(distance))| distance)
    }

    pub fn is_settled(&self, node: NodeId) -> bool {
        self.settled.contains_key(&node)
    }

    pub fn settled_distance(&self, node: NodeId) -> Option<Weight> {
        self.settled.get(&node).copied()
    }

    pub fn parent_of(&self, node: NodeId) -> Option<&RouteEntry> {
        self.parents.get(&node)
    }

    pub fn parents(&self) -> &FxHashMap<NodeId, RouteEntry> {
        &self.parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_queues_without_settling() {
        let mut frontier = Frontier::new();
        frontier.seed(3);
        assert!(!frontier.is_settled(3));
        assert_eq!(frontier.peek_distance(), Some(0));
        assert_eq!(frontier.parent_of(3), Some(&RouteEntry::root()));
    }

    #[test]
    fn test_push_settles_on_discover() {
        let mut frontier = Frontier::new();
        frontier.seed(0);
        frontier.push(
            1,
            5,
            RouteEntry {
                parent: Some(0),
                cost: 5,
                edge: Some(0),
                label: None,
            },
        );
        // Settled before ever being popped.
        assert_eq!(frontier.settled_distance(1), Some(5));
    }

    #[test]
    fn test_pop_returns_min_and_improve_updates_parent() {
        let mut frontier = Frontier::new();
        frontier.seed(0);
        frontier.push(
            1,
            9,
            RouteEntry {
                parent: Some(0),
                cost: 9,
                edge: Some(0),
                label: None,
            },
        );
        frontier.push(
            2,
            4,
            RouteEntry {
                parent: Some(0),
                cost: 4,
                edge: Some(1),
                label: None,
            },
        );
        assert_eq!(frontier.pop(), Some((0, 0)));
        assert!(frontier.is_settled(0));

        // A cheaper route to 1 supersedes both queue entry and parent.
        frontier.push(
            1,
            6,
            RouteEntry {
                parent: Some(2),
                cost: 2,
                edge: Some(2),
                label: None,
            },
        );
        assert_eq!(frontier.pop(), Some((2, 4)));
        assert_eq!(frontier.pop(), Some((1, 6)));
        assert_eq!(frontier.parent_of(1).unwrap().parent, Some(2));
        assert!(frontier.is_empty());
        assert_eq!(frontier.pop(), None);
    }
}
