/// Core workflow type definitions
///
/// Defines the graph snapshot handed to the engine by the editor: nodes, edges
/// and the run status reported back. Field names follow the editor's JSON
/// (camelCase) so snapshots deserialize without translation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type whose boolean output gates its structurally nested children
pub const GATE_NODE_TYPE: &str = "ruleGateNode";

/// A complete workflow snapshot containing nodes and their connections
///
/// The editor owns and mutates this at any time except mid-run. A run takes
/// one snapshot at start and never observes later changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow identifier (e.g., "wf-summarize")
    #[serde(default)]
    pub id: String,
    /// Human-readable workflow name
    #[serde(default)]
    pub name: String,
    /// List of nodes in this workflow
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// List of edges connecting node handles
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A single node in the workflow graph
///
/// `node_type` selects the registered computation. `data` holds the node's
/// persisted configuration, which doubles as its default inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique node identifier within the workflow (e.g., "n1", "gate-a")
    pub id: String,
    /// Registered computation name (e.g., "textTemplateNode")
    #[serde(rename = "type")]
    pub node_type: String,
    /// Persisted configuration and default input values
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Structural parent; implies ordering only when the parent is a gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Node {
    /// Create a node with the given data and no parent
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data: match data {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            parent_id: None,
        }
    }

    /// Nest this node under `parent_id`
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Whether this node is a gate
    pub fn is_gate(&self) -> bool {
        self.node_type == GATE_NODE_TYPE
    }
}

/// Handle-addressed connection between two nodes
///
/// The upstream node's whole output is written into the target's resolved
/// inputs, under `target_handle` or at `data.path` when one is set. An edge
/// without a target handle is structurally invalid and aborts the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Edge identifier
    pub id: String,
    /// Upstream node ID
    pub source: String,
    /// Downstream node ID
    pub target: String,
    /// Output handle on the source node (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Optional write location inside the target's inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

/// Extra edge payload set by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Dot-separated path (e.g., "textInputs.text1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Edge {
    /// Create an edge writing into `target_handle`
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: Some(target_handle.into()),
            data: None,
        }
    }

    /// Write the source output at a dotted path instead of the handle key
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.data = Some(EdgeData {
            path: Some(path.into()),
        });
        self
    }

    /// The dotted write path, if any
    pub fn path(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.path.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// Engine-wide run status reported to observers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Idle,
    Processing,
    Done,
    Error,
}
