/// Workflow Model Layer
///
/// This module defines the graph snapshot the engine consumes and the provider
/// that hands it out:
/// - Type definitions (Workflow, Node, Edge, RunStatus)
/// - Lock-free graph provider using ArcSwap

// Core workflow type definitions
pub mod types;

// Hot-swappable snapshot holder for the editor-owned graph
pub mod registry;

// Re-export commonly used types
pub use registry::GraphProvider;
pub use types::{Edge, EdgeData, Node, RunStatus, Workflow, GATE_NODE_TYPE};
