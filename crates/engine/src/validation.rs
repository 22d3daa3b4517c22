//! Graph validation — run this before handing a graph document to the
//! simulator when you want structural problems reported as errors rather than
//! discovered mid-run.
//!
//! Rules enforced:
//! 1. Node IDs must be unique within the graph.
//! 2. Every edge must reference valid node IDs (both `source` and `target`).
//! 3. At least one start node must exist.
//!
//! Cycles are fine: a run visits each node at most once.

use std::collections::HashSet;

use crate::{EngineError, models::Graph};

/// Validate the graph and return its start node IDs in document order.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EngineError::NoStartNode`] if no node is of type `start`.
pub fn validate_graph(graph: &Graph) -> Result<Vec<String>, EngineError> {
    let mut node_set: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !node_set.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    for edge in &graph.edges {
        if !node_set.contains(edge.source.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !node_set.contains(edge.target.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    let starts: Vec<String> = graph.start_nodes().map(|n| n.id.clone()).collect();
    if starts.is_empty() {
        return Err(EngineError::NoStartNode);
    }

    Ok(starts)
}
