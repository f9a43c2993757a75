//! Workflow pipeline nodes, edges, and run events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newtype wrapper for workflow node identifiers (e.g. `"red-1"`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a new `NodeId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a node in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeRole {
    /// A reasoning step
    Agent,
    /// A tool invocation step
    Tool,
    /// A passive data source or sink
    Data,
}

/// Execution status of a node within one run.
///
/// `Success` and `Error` are terminal for the node until the run is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Not yet executed
    #[default]
    Idle,
    /// Currently executing
    Running,
    /// Completed normally
    Success,
    /// Completed with the error sentinel
    Error,
}

/// A step in the linear reasoning/tool pipeline.
///
/// Layout position is owned by presentation collaborators and does not
/// appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Node identity
    pub id: NodeId,
    /// Role of the node
    pub role: NodeRole,
    /// Display label (e.g. `"Recon Agent"`); also drives keyword routing
    /// when no reasoning backend is configured
    pub label: String,
    /// Optional sub-label describing the node's role in prose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
    /// Execution status within the current run
    #[serde(default)]
    pub status: NodeStatus,
}

/// An ordered pair of node identities defining traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    /// Upstream node
    pub source: NodeId,
    /// Downstream node
    pub target: NodeId,
}

/// Kind of event emitted while a node executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEventKind {
    /// Input handed to the node
    Input,
    /// Output produced by the node or a tool
    Output,
    /// Free-text reasoning
    Thought,
    /// A requested tool invocation
    ToolCall,
}

/// An immutable event appended during a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Event identity
    pub id: Uuid,
    /// When the event was produced
    pub timestamp: DateTime<Utc>,
    /// Originating node
    pub node_id: NodeId,
    /// Kind of event
    pub kind: WorkflowEventKind,
    /// Content text
    pub content: String,
}

impl WorkflowEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(node_id: NodeId, kind: WorkflowEventKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            node_id,
            kind,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_defaults_to_idle() {
        let node = WorkflowNode {
            id: NodeId::new("red-1"),
            role: NodeRole::Agent,
            label: "Recon Agent".to_string(),
            sub_label: None,
            status: NodeStatus::default(),
        };
        assert_eq!(node.status, NodeStatus::Idle);
    }

    #[test]
    fn event_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&WorkflowEventKind::ToolCall).unwrap();
        assert_eq!(json, "\"TOOL_CALL\"");
    }
}
