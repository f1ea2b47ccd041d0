//! Typed errors for the query engine.

use std::fmt;

use crate::graph::NodeId;

/// The one expected query failure: the frontiers exhausted without ever
/// finding a meeting node. Callers should treat it as "no route exists"
/// and not retry with the same inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    PathNotFound { source: NodeId, target: NodeId },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::PathNotFound { source, target } => write!(
                f,
                "no path found between node {source} and node {target}"
            ),
        }
    }
}

impl std::error::Error for QueryError {}
