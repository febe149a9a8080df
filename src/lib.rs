/// Gateflow: graph execution engine for visual node workflows
///
/// This library runs editor-authored node graphs: it orders nodes
/// topologically, prunes subtrees nested under closed rule gates, resolves
/// each node's inputs from upstream outputs and executes registered node
/// computations one at a time.

// Core configuration and setup
pub mod config;

// Workflow model layer - snapshot types and the hot-swappable graph provider
pub mod workflow;

// Runtime execution engine - petgraph DAG scheduling, gating and node execution
pub mod runtime;

// Built-in node computations registered under the editor's type names
pub mod nodes;

// HTTP API layer - REST endpoints for the workflow snapshot and run control
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use runtime::{EngineError, ExecutionEngine, NodeRegistry, RunReport};
pub use server::start_server;
pub use workflow::{Edge, GraphProvider, Node, RunStatus, Workflow};
