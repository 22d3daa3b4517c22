//! Run transcript and node status types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nodes::LogLevel;

/// Execution state of a node as shown on the canvas.
///
/// The "cleared" state is `None` wherever an `Option<NodeStatus>` is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Running,
    Success,
    Failed,
}

/// One line of the run transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    /// `None` for workflow-level messages.
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_title: Option<String>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// A workflow-level entry, stamped now.
    pub fn workflow(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            node_id: None,
            node_title: None,
            level,
            message: message.into(),
        }
    }

    /// An entry about a specific node, stamped now.
    pub fn node(
        node_id: impl Into<String>,
        node_title: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            time: Utc::now(),
            node_id: Some(node_id.into()),
            node_title: Some(node_title.into()),
            level,
            message: message.into(),
        }
    }

    pub fn is_workflow_level(&self) -> bool {
        self.node_id.is_none()
    }
}

/// Final outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    /// Every entry delivered to the log callback, in the same order.
    pub logs: Vec<LogEntry>,
}

impl RunResult {
    /// Whether the run ended because it was cancelled rather than because a
    /// node failed. Cancellation is the only outcome that closes the
    /// transcript with a workflow-level `info` entry.
    pub fn was_cancelled(&self) -> bool {
        !self.success
            && self
                .logs
                .last()
                .is_some_and(|e| e.is_workflow_level() && e.level == LogLevel::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_serializes_camel_case() {
        let entry = LogEntry::node("t1", "Review", LogLevel::Success, "Task \"Review\" completed.");
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["nodeId"], "t1");
        assert_eq!(value["nodeTitle"], "Review");
        assert_eq!(value["level"], "success");
        assert!(value["time"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn workflow_entry_has_null_node_id() {
        let value = serde_json::to_value(LogEntry::workflow(LogLevel::Error, "boom")).unwrap();
        assert_eq!(value["nodeId"], json!(null));
        assert!(value.get("nodeTitle").is_none());
    }

    #[test]
    fn cancellation_is_read_from_last_entry() {
        let cancelled = RunResult {
            success: false,
            logs: vec![LogEntry::workflow(LogLevel::Info, "Simulation aborted by user.")],
        };
        let failed = RunResult {
            success: false,
            logs: vec![LogEntry::workflow(LogLevel::Error, "Workflow stopped due to failure at node s.")],
        };

        assert!(cancelled.was_cancelled());
        assert!(!failed.was_cancelled());
        assert!(!RunResult { success: false, logs: vec![] }.was_cancelled());
    }
}
