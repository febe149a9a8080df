/// Runtime Execution Engine
///
/// This module provides the petgraph-based DAG execution engine for workflows.
/// It handles:
/// - Converting workflow snapshots to dependency graphs (data and gate edges)
/// - Cycle detection and topological ordering
/// - Gate propagation and input resolution
/// - Sequential node execution with status and output events

// Core execution engine walking the topological order
pub mod engine;

// Engine error taxonomy
pub mod error;

// Individual node execution and the computation registry
pub mod executor;

// Petgraph dependency graph built from a snapshot
pub mod graph;

// Cycle detection over explicit edges
pub mod cycle;

// Kahn's algorithm over data and gate edges
pub mod scheduler;

// Online skip set driven by gate outputs
pub mod gate;

// Input object assembly from upstream outputs
pub mod resolver;

// Status and output events for observers
pub mod events;

// Re-export main types
pub use engine::{ExecutionEngine, RunReport};
pub use error::EngineError;
pub use events::{ChannelObserver, ExecutionEvent, ExecutionObserver, NoopObserver};
pub use executor::{NodeComputation, NodeOutcome, NodeRegistry};
