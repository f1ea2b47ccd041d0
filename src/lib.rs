pub mod cli;
pub mod error;
pub mod graph;
pub mod query;

pub use error::QueryError;
pub use graph::{ChGraph, Edge, GraphBuilder};
pub use query::{BidirectionalDijkstra, Path};
