//! Engine-level error types.
//!
//! A simulation run never returns these: everything that goes wrong during a
//! run ends up in its log. They cover loading and checking a graph up front.

use thiserror::Error;

/// Errors produced while loading or validating a workflow graph.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the graph.
    #[error("edge references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        node_id: String,
        side: &'static str,
    },

    /// Nothing to start the simulation from.
    #[error("graph has no start node")]
    NoStartNode,

    /// The graph document could not be decoded.
    #[error("invalid graph document: {0}")]
    Parse(#[from] serde_json::Error),
}
