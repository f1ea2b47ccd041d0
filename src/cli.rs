//! CLI commands for ch-route.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QueryError;
use crate::graph::{ChGraph, NodeId};
use crate::query::{dijkstra, BidirectionalDijkstra};

#[derive(Parser)]
#[command(name = "ch-route")]
#[command(about = "Shortest-path queries on contraction-hierarchy graphs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query on the bundled example graph
    Demo,
    /// Find the shortest path between two nodes
    Route {
        /// Graph file (JSON)
        graph: PathBuf,
        /// Source node id
        #[arg(long)]
        source: NodeId,
        /// Target node id
        #[arg(long)]
        target: NodeId,
        /// Emit the path as JSON instead of the plain rendering
        #[arg(long)]
        json: bool,
    },
    /// Query every node reachable from one source
    RouteAll {
        /// Graph file (JSON)
        graph: PathBuf,
        /// Source node id
        #[arg(long)]
        source: NodeId,
    },
    /// Compare bidirectional queries against a reference Dijkstra
    Validate {
        /// Graph file (JSON)
        graph: PathBuf,
        /// Number of random source/target pairs to check
        #[arg(long, default_value = "100")]
        queries: usize,
        /// RNG seed, fixed for reproducible runs
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo => demo(),
        Commands::Route {
            graph,
            source,
            target,
            json,
        } => route(&graph, source, target, json),
        Commands::RouteAll { graph, source } => route_all(&graph, source),
        Commands::Validate {
            graph,
            queries,
            seed,
        } => validate(&graph, queries, seed),
    }
}

fn load_graph(path: &Path) -> Result<ChGraph> {
    let graph = ChGraph::load(path)
        .with_context(|| format!("failed to load graph from {}", path.display()))?;
    println!(
        "Loaded graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn check_node(graph: &ChGraph, node: NodeId, what: &str) -> Result<()> {
    if node as usize >= graph.node_count() {
        bail!(
            "{} node {} is out of range (graph has {} nodes)",
            what,
            node,
            graph.node_count()
        );
    }
    Ok(())
}

fn demo() -> Result<()> {
    let graph = ChGraph::demo();
    let mut engine = BidirectionalDijkstra::new(&graph);

    let path = engine.execute(0, 4)?;
    println!("{}", path);
    println!(
        "Expanded {} nodes forward, {} backward",
        engine.expanded_forward(),
        engine.expanded_backward()
    );
    Ok(())
}

fn route(path: &Path, source: NodeId, target: NodeId, json: bool) -> Result<()> {
    let graph = load_graph(path)?;
    check_node(&graph, source, "source")?;
    check_node(&graph, target, "target")?;

    let mut engine = BidirectionalDijkstra::new(&graph);
    let result = engine.execute(source, target)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result);
    }
    println!(
        "Expanded {} nodes forward, {} backward",
        engine.expanded_forward(),
        engine.expanded_backward()
    );
    Ok(())
}

fn route_all(path: &Path, source: NodeId) -> Result<()> {
    let graph = load_graph(path)?;
    check_node(&graph, source, "source")?;

    let mut engine = BidirectionalDijkstra::new(&graph);
    engine.execute_to_all(source);
    Ok(())
}

/// Random pairs, bidirectional engine vs. reference Dijkstra. Exits
/// non-zero on the first summary with any mismatch.
fn validate(path: &Path, queries: usize, seed: u64) -> Result<()> {
    let graph = load_graph(path)?;
    if graph.node_count() < 2 {
        bail!("graph needs at least two nodes to validate");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut engine = BidirectionalDijkstra::new(&graph);
    let mut mismatches = 0usize;
    let mut found = 0usize;

    for _ in 0..queries {
        let source = rng.gen_range(0..graph.node_count()) as NodeId;
        let target = rng.gen_range(0..graph.node_count()) as NodeId;

        let expected = dijkstra::shortest_path_weight(&graph, source, target);
        match (engine.execute(source, target), expected) {
            (Ok(route), Some(weight)) if route.total_weight == weight => found += 1,
            (Ok(route), Some(weight)) => {
                mismatches += 1;
                eprintln!(
                    "MISMATCH {source} -> {target}: engine {} vs reference {}",
                    route.total_weight, weight
                );
            }
            (Ok(route), None) => {
                mismatches += 1;
                eprintln!(
                    "MISMATCH {source} -> {target}: engine found weight {} but reference found no path",
                    route.total_weight
                );
            }
            (Err(QueryError::PathNotFound { .. }), Some(weight)) => {
                mismatches += 1;
                eprintln!(
                    "MISMATCH {source} -> {target}: engine found no path but reference found weight {weight}"
                );
            }
            (Err(QueryError::PathNotFound { .. }), None) => {}
        }
    }

    println!(
        "Validated {} queries ({} with a path), {} mismatches",
        queries, found, mismatches
    );
    if mismatches > 0 {
        bail!("{} of {} queries disagreed with the reference", mismatches, queries);
    }
    Ok(())
}
