//! Core domain models for the workflow graph.
//!
//! These types are what the engine consumes. They (de)serialize from the
//! `{ nodes, edges }` document the graph editor imports and exports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use nodes::NodeKind;

use crate::EngineError;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single step in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeDocument", into = "NodeDocument")]
pub struct Node {
    /// Unique identifier within this graph (referenced by edges).
    pub id: String,
    /// Display title; defaults to the ID when the document has none.
    pub title: String,
    /// Step type and its type-specific fields.
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
        }
    }
}

/// Flat node fields as the editor writes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeFields {
    #[serde(rename = "type", alias = "_nodeType", default, skip_serializing_if = "Option::is_none")]
    node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignee: Option<String>,
    /// Kept loose: anything that is not a JSON number counts as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_approve_threshold: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_params: Option<Map<String, Value>>,
}

/// Wire shape of a node. Accepts both the flat form and the canvas export,
/// which nests the fields under `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeDocument {
    id: String,
    #[serde(flatten)]
    fields: NodeFields,
    #[serde(default, skip_serializing)]
    data: Option<NodeFields>,
}

impl From<NodeDocument> for Node {
    fn from(doc: NodeDocument) -> Self {
        let fields = doc.data.unwrap_or(doc.fields);

        let kind = match fields.node_type.as_deref() {
            Some("start") => NodeKind::Start,
            Some("end") => NodeKind::End,
            Some("task") => NodeKind::Task {
                assignee: fields.assignee,
            },
            Some("approval") => NodeKind::Approval {
                auto_approve_threshold: fields.auto_approve_threshold.as_ref().and_then(Value::as_f64),
            },
            Some("automated") => NodeKind::Automated {
                action_id: fields.action_id,
                action_params: fields.action_params,
            },
            _ => NodeKind::Generic,
        };

        let title = fields
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| doc.id.clone());

        Node {
            id: doc.id,
            title,
            kind,
        }
    }
}

impl From<Node> for NodeDocument {
    fn from(node: Node) -> Self {
        let mut fields = NodeFields {
            node_type: Some(node.kind.type_name().to_owned()),
            title: Some(node.title),
            ..NodeFields::default()
        };

        match node.kind {
            NodeKind::Task { assignee } => fields.assignee = assignee,
            NodeKind::Approval { auto_approve_threshold } => {
                fields.auto_approve_threshold = auto_approve_threshold.map(Value::from);
            }
            NodeKind::Automated { action_id, action_params } => {
                fields.action_id = action_id;
                fields.action_params = action_params;
            }
            NodeKind::Start | NodeKind::End | NodeKind::Generic => {}
        }

        NodeDocument {
            id: node.id,
            fields,
            data: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A complete workflow graph as produced by the editor.
///
/// Edge order matters: fan-out edges are followed in the order listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a `{ nodes, edges }` JSON document.
    ///
    /// # Errors
    /// [`EngineError::Parse`] if the document is not valid JSON of that shape.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Start nodes in document order.
    pub fn start_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind.is_start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_document_maps_to_node_kinds() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": [
                { "id": "s", "type": "start", "title": "Begin" },
                { "id": "t", "type": "task", "title": "Review", "assignee": "bob" },
                { "id": "a", "type": "approval", "autoApproveThreshold": 3 },
                { "id": "x", "type": "automated", "actionId": "send_email",
                  "actionParams": { "to": "ops@example.com" } },
                { "id": "e", "type": "end" },
                { "id": "g", "type": "sticky-note" }
            ],
            "edges": [ { "source": "s", "target": "t" } ]
        }))
        .unwrap();

        assert_eq!(graph.nodes[0].kind, NodeKind::Start);
        assert_eq!(graph.nodes[0].title, "Begin");
        assert_eq!(graph.nodes[1].kind, NodeKind::Task { assignee: Some("bob".into()) });
        assert_eq!(graph.nodes[2].kind, NodeKind::Approval { auto_approve_threshold: Some(3.0) });
        assert_eq!(graph.nodes[2].title, "a", "title falls back to the id");
        match &graph.nodes[3].kind {
            NodeKind::Automated { action_id, action_params } => {
                assert_eq!(action_id.as_deref(), Some("send_email"));
                assert_eq!(action_params.as_ref().unwrap()["to"], "ops@example.com");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(graph.nodes[4].kind, NodeKind::End);
        assert_eq!(graph.nodes[5].kind, NodeKind::Generic);
        assert_eq!(graph.edges, vec![Edge::new("s", "t")]);
    }

    #[test]
    fn canvas_export_with_nested_data_is_accepted() {
        let graph = Graph::from_json(
            r#"{
                "nodes": [
                    { "id": "n1", "position": { "x": 0, "y": 0 },
                      "data": { "_nodeType": "task", "title": "Sign", "assignee": "" } }
                ],
                "edges": [ { "id": "e1", "source": "n1", "target": "n2" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.nodes[0].title, "Sign");
        assert_eq!(graph.nodes[0].kind, NodeKind::Task { assignee: Some(String::new()) });
    }

    #[test]
    fn non_numeric_threshold_counts_as_unset() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": [ { "id": "a", "type": "approval", "autoApproveThreshold": "high" } ]
        }))
        .unwrap();

        assert_eq!(graph.nodes[0].kind, NodeKind::Approval { auto_approve_threshold: None });
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn missing_type_is_generic() {
        let node: Node = serde_json::from_value(json!({ "id": "plain" })).unwrap();
        assert_eq!(node.kind, NodeKind::Generic);
    }

    #[test]
    fn serializes_back_to_flat_form() {
        let node = Node::new("t", "Review", NodeKind::Task { assignee: Some("bob".into()) });
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(
            value,
            json!({ "id": "t", "type": "task", "title": "Review", "assignee": "bob" })
        );
        assert_eq!(serde_json::from_value::<Node>(value).unwrap(), node);
    }

    #[test]
    fn invalid_document_is_a_parse_error() {
        assert!(matches!(Graph::from_json("{ nodes: "), Err(EngineError::Parse(_))));
    }
}
