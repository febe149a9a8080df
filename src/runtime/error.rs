/// Engine error taxonomy
///
/// Every variant is fatal to the current run. Gate-driven skipping is not an
/// error and has no variant here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cycle detected in workflow: {}", format_cycle(cycle))]
    CycleDetected { cycle: Vec<String> },

    #[error("edge '{edge_id}' has no target handle")]
    MissingTargetHandle { edge_id: String },

    #[error("no computation registered for node '{node_id}' of type '{node_type}'")]
    UnknownNodeType { node_id: String, node_type: String },

    #[error("node '{node_id}' failed: {source:#}")]
    NodeComputation {
        node_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("node '{node_id}' did not finish within {timeout_ms}ms")]
    NodeTimeout { node_id: String, timeout_ms: u64 },

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("edge '{edge_id}' references unknown node: {node_id}")]
    UnknownEdgeEndpoint { edge_id: String, node_id: String },

    #[error("a run is already in progress")]
    RunInProgress,

    #[error("run was aborted before completion")]
    RunAborted,
}

/// Render a cycle as a closed loop, e.g. `A -> B -> A`
fn format_cycle(cycle: &[String]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first);
    }
    parts.join(" -> ")
}

impl EngineError {
    /// Stable machine-readable name for API bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "cycle_detected",
            Self::MissingTargetHandle { .. } => "missing_target_handle",
            Self::UnknownNodeType { .. } => "unknown_node_type",
            Self::NodeComputation { .. } => "node_computation",
            Self::NodeTimeout { .. } => "node_timeout",
            Self::DuplicateNodeId(_) => "duplicate_node_id",
            Self::UnknownEdgeEndpoint { .. } => "unknown_edge_endpoint",
            Self::RunInProgress => "run_in_progress",
            Self::RunAborted => "run_aborted",
        }
    }

    /// Node the error is attributed to, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::UnknownNodeType { node_id, .. }
            | Self::NodeComputation { node_id, .. }
            | Self::NodeTimeout { node_id, .. } => Some(node_id),
            Self::DuplicateNodeId(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the graph itself is invalid, as opposed to a node failing at run time
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. }
                | Self::MissingTargetHandle { .. }
                | Self::UnknownNodeType { .. }
                | Self::DuplicateNodeId(_)
                | Self::UnknownEdgeEndpoint { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = EngineError::CycleDetected {
            cycle: vec!["A".into(), "B".into(), "C".into()],
        };
        assert_eq!(err.to_string(), "cycle detected in workflow: A -> B -> C -> A");
        assert!(err.is_graph_error());
    }

    #[test]
    fn computation_error_keeps_node_context() {
        let err = EngineError::NodeComputation {
            node_id: "sum".into(),
            source: anyhow::anyhow!("Invalid input"),
        };
        assert_eq!(err.node_id(), Some("sum"));
        assert_eq!(err.kind(), "node_computation");
        assert!(!err.is_graph_error());
        assert!(err.to_string().contains("Invalid input"));
    }
}
