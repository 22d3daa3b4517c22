//! The per-type payload of a workflow node.

use serde_json::{Map, Value};

/// What kind of step a node is, together with the fields only that kind uses.
///
/// The editor stores every field on one flat object; the engine turns that
/// into this union once, so the executor can match exhaustively instead of
/// probing for optional properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    /// Entry point of a branch.
    Start,
    /// Human task; needs somebody assigned to it.
    Task {
        assignee: Option<String>,
    },
    /// Approval gate. A threshold `<= 0` auto-approves.
    Approval {
        auto_approve_threshold: Option<f64>,
    },
    /// Automated action looked up in the automation catalogue.
    Automated {
        action_id: Option<String>,
        action_params: Option<Map<String, Value>>,
    },
    /// Terminal node.
    End,
    /// Anything the engine does not know about.
    #[default]
    Generic,
}

impl NodeKind {
    /// The `type` tag used in the graph document.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Task { .. } => "task",
            NodeKind::Approval { .. } => "approval",
            NodeKind::Automated { .. } => "automated",
            NodeKind::End => "end",
            NodeKind::Generic => "generic",
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, NodeKind::Start)
    }
}
