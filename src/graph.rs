//! Leveled graph store consumed by the query engine.
//!
//! The graph is assumed to have been through Contraction Hierarchies
//! preprocessing already: every node carries a hierarchy level and
//! shortcut edges sit in the edge table next to the original road
//! segments. How levels were assigned or shortcuts created is not this
//! crate's concern; the store is frozen once built and queries only read.
//!
//! Node and edge ids are dense `u32` indices. Edge weights are
//! non-negative integers (deciseconds, meters, whatever the
//! preprocessing used — the engine never interprets the unit).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub type NodeId = u32;
pub type EdgeId = u32;
pub type Weight = u32;

/// A directed edge of the contracted graph. Shortcuts carry no label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Weight,
    pub label: Option<String>,
}

/// Frozen adjacency view of a contracted graph.
#[derive(Debug, Clone, Default)]
pub struct ChGraph {
    levels: Vec<u32>,
    edges: Vec<Edge>,
    out_edges: Vec<Vec<EdgeId>>,
    in_edges: Vec<Vec<EdgeId>>,
}

/// On-disk shape of a graph file. Edge ids are implicit in order.
#[derive(Serialize, Deserialize)]
struct GraphFile {
    levels: Vec<u32>,
    edges: Vec<EdgeSpec>,
}

#[derive(Serialize, Deserialize)]
struct EdgeSpec {
    from: NodeId,
    to: NodeId,
    weight: Weight,
    label: Option<String>,
}

impl ChGraph {
    pub fn node_count(&self) -> usize {
        self.levels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Hierarchy level of a node. Higher means more important.
    pub fn level(&self, node: NodeId) -> u32 {
        self.levels[node as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id as usize]
    }

    pub fn out_edge_ids(&self, node: NodeId) -> &[EdgeId] {
        &self.out_edges[node as usize]
    }

    pub fn in_edge_ids(&self, node: NodeId) -> &[EdgeId] {
        &self.in_edges[node as usize]
    }

    /// Successors of `node` with the cheapest edge weight per neighbor.
    ///
    /// Folding parallel edges to their minimum keeps a more expensive
    /// duplicate from ever winning a relaxation.
    pub fn outgoing_neighborhood(&self, node: NodeId) -> FxHashMap<NodeId, Weight> {
        let mut neighbors = FxHashMap::default();
        for &id in self.out_edge_ids(node) {
            let edge = &self.edges[id as usize];
            let weight = neighbors.entry(edge.to).or_insert(edge.weight);
            if edge.weight < *weight {
                *weight = edge.weight;
            }
        }
        neighbors
    }

    /// Predecessors of `node` with the cheapest edge weight per neighbor.
    pub fn incoming_neighborhood(&self, node: NodeId) -> FxHashMap<NodeId, Weight> {
        let mut neighbors = FxHashMap::default();
        for &id in self.in_edge_ids(node) {
            let edge = &self.edges[id as usize];
            let weight = neighbors.entry(edge.from).or_insert(edge.weight);
            if edge.weight < *weight {
                *weight = edge.weight;
            }
        }
        neighbors
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = GraphFile {
            levels: self.levels.clone(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeSpec {
                    from: e.from,
                    to: e.to,
                    weight: e.weight,
                    label: e.label.clone(),
                })
                .collect(),
        };
        let writer = BufWriter::new(
            File::create(path.as_ref())
                .with_context(|| format!("failed to create {}", path.as_ref().display()))?,
        );
        serde_json::to_writer(writer, &file).context("failed to serialize graph")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(
            File::open(path.as_ref())
                .with_context(|| format!("failed to open {}", path.as_ref().display()))?,
        );
        let file: GraphFile =
            serde_json::from_reader(reader).context("failed to deserialize graph")?;

        let mut builder = GraphBuilder::new();
        for &level in &file.levels {
            builder.add_node(level);
        }
        for (i, spec) in file.edges.iter().enumerate() {
            if spec.from as usize >= file.levels.len() || spec.to as usize >= file.levels.len() {
                bail!(
                    "edge {} references a missing node ({} -> {})",
                    i,
                    spec.from,
                    spec.to
                );
            }
            builder.add_edge(spec.from, spec.to, spec.weight, spec.label.clone());
        }
        Ok(builder.build())
    }

    /// Small hand-contracted network used by the demo command and tests.
    ///
    /// Five nodes on a main road 0-1-2-3-4 plus a slow ring road 0-4;
    /// nodes 1 and 3 were contracted first, leaving shortcuts 0<->2 and
    /// 2<->4. The cheapest route from 0 to 4 costs 10.
    pub fn demo() -> Self {
        let mut builder = GraphBuilder::new();
        for level in [2, 0, 4, 1, 3] {
            builder.add_node(level);
        }
        let mut road = |from: NodeId, to: NodeId, weight: Weight, name: &str| {
            builder.add_edge(from, to, weight, Some(name.to_owned()));
            builder.add_edge(to, from, weight, Some(name.to_owned()));
        };
        road(0, 1, 3, "canal st");
        road(1, 2, 2, "elm st");
        road(2, 3, 4, "hill rd");
        road(3, 4, 1, "bridge way");
        road(0, 4, 15, "ring rd");

        // Shortcuts from contracting nodes 1 and 3.
        let mut shortcut = |from: NodeId, to: NodeId, weight: Weight| {
            builder.add_edge(from, to, weight, None);
            builder.add_edge(to, from, weight, None);
        };
        shortcut(0, 2, 5);
        shortcut(2, 4, 5);

        builder.build()
    }
}

/// The only mutation surface. Queries see a frozen [`ChGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    levels: Vec<u32>,
    edges: Vec<Edge>,
    out_edges: Vec<Vec<EdgeId>>,
    in_edges: Vec<Vec<EdgeId>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, level: u32) -> NodeId {
        let id = self.levels.len() as NodeId;
        self.levels.push(level);
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        id
    }

    /// Both endpoints must have been added already.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: Weight,
        label: Option<String>,
    ) -> EdgeId {
        assert!(
            (from as usize) < self.levels.len() && (to as usize) < self.levels.len(),
            "edge endpoints must be added before the edge"
        );
        let id = self.edges.len() as EdgeId;
        self.edges.push(Edge {
            id,
            from,
            to,
            weight,
            label,
        });
        self.out_edges[from as usize].push(id);
        self.in_edges[to as usize].push(id);
        id
    }

    pub fn build(self) -> ChGraph {
        ChGraph {
            levels: self.levels,
            edges: self.edges,
            out_edges: self.out_edges,
            in_edges: self.in_edges,
        }
    }
}
