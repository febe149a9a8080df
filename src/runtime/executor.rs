/// Node execution
///
/// Dispatches a node to the computation registered for its type, awaits the
/// (possibly deferred) result, and attributes any failure to the node.

use crate::runtime::error::EngineError;
use crate::workflow::types::Node;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc, time::Duration};

/// A per-type node computation
///
/// Receives the resolved input object and yields the node's output. Results
/// that are available immediately are returned as a ready future.
pub trait NodeComputation: Send + Sync + 'static {
    fn compute(&self, inputs: Map<String, Value>) -> BoxFuture<'_, anyhow::Result<Value>>;
}

/// Plain async functions and closures are computations
impl<F, Fut> NodeComputation for F
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    fn compute(&self, inputs: Map<String, Value>) -> BoxFuture<'_, anyhow::Result<Value>> {
        Box::pin((self)(inputs))
    }
}

/// Startup-time mapping from node type name to computation
///
/// Fixed once the engine is built and consulted for every node.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    computations: HashMap<String, Arc<dyn NodeComputation>>,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("types", &self.types())
            .finish()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the computation for `node_type`
    pub fn register(&mut self, node_type: impl Into<String>, computation: impl NodeComputation) -> &mut Self {
        self.computations.insert(node_type.into(), Arc::new(computation));
        self
    }

    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeComputation>> {
        self.computations.get(node_type).cloned()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.computations.contains_key(node_type)
    }

    /// Registered type names, sorted
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.computations.keys().cloned().collect();
        types.sort();
        types
    }
}

/// What happened to a node during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum NodeOutcome {
    /// The computation ran and produced this (possibly null) output
    Executed(Value),
    /// Pruned by a closed gate; no computation, no output
    Skipped,
    /// The computation failed; the run aborted here
    Failed(String),
}

/// Node executor that resolves computations from the registry
#[derive(Debug)]
pub struct NodeExecutor {
    registry: NodeRegistry,
    /// Upper bound on a single computation; `None` waits indefinitely
    node_timeout: Option<Duration>,
}

impl NodeExecutor {
    pub fn new(registry: NodeRegistry, node_timeout: Option<Duration>) -> Self {
        Self {
            registry,
            node_timeout,
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Execute a single node with its resolved inputs
    ///
    /// Completes only once the computation's deferred tail has finished.
    pub async fn execute_node(&self, node: &Node, inputs: Map<String, Value>) -> Result<Value, EngineError> {
        let computation = self
            .registry
            .get(&node.node_type)
            .ok_or_else(|| EngineError::UnknownNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            })?;

        tracing::debug!(
            "Input for '{}': {}",
            node.id,
            serde_json::to_string(&inputs).unwrap_or_else(|_| "invalid_json".to_string())
        );
        let start_time = std::time::Instant::now();

        let result = match self.node_timeout {
            Some(limit) => match tokio::time::timeout(limit, computation.compute(inputs)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!("Node '{}' timed out after {:?}", node.id, limit);
                    return Err(EngineError::NodeTimeout {
                        node_id: node.id.clone(),
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => computation.compute(inputs).await,
        };

        let duration = start_time.elapsed();
        match result {
            Ok(output) => {
                tracing::info!("Node '{}' ({}) completed in {:?}", node.id, node.node_type, duration);
                Ok(output)
            }
            Err(source) => {
                tracing::error!("Node '{}' failed after {:?}: {:#}", node.id, duration, source);
                Err(EngineError::NodeComputation {
                    node_id: node.id.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry
            .register("echo", |inputs: Map<String, Value>| async move {
                Ok::<_, anyhow::Error>(Value::Object(inputs))
            })
            .register("boom", |_inputs: Map<String, Value>| async move {
                Err::<Value, _>(anyhow::anyhow!("exploded"))
            })
            .register("slow", |_inputs: Map<String, Value>| async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, anyhow::Error>(json!("late"))
            });
        registry
    }

    #[tokio::test]
    async fn dispatches_by_type() {
        let executor = NodeExecutor::new(registry(), None);
        let node = Node::new("n", "echo", json!({}));
        let inputs = json!({ "a": 1 }).as_object().cloned().unwrap();

        assert_eq!(executor.execute_node(&node, inputs).await.unwrap(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn awaits_deferred_results() {
        let executor = NodeExecutor::new(registry(), None);
        let node = Node::new("n", "slow", json!({}));
        assert_eq!(executor.execute_node(&node, Map::new()).await.unwrap(), json!("late"));
    }

    #[tokio::test]
    async fn unknown_type_is_an_error() {
        let executor = NodeExecutor::new(registry(), None);
        let node = Node::new("n", "mystery", json!({}));

        let err = executor.execute_node(&node, Map::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownNodeType { node_type, .. } if node_type == "mystery"));
    }

    #[tokio::test]
    async fn failures_carry_node_id() {
        let executor = NodeExecutor::new(registry(), None);
        let node = Node::new("bad", "boom", json!({}));

        let err = executor.execute_node(&node, Map::new()).await.unwrap_err();
        assert_eq!(err.node_id(), Some("bad"));
        assert!(err.to_string().contains("exploded"));
    }

    #[tokio::test]
    async fn optional_timeout_bounds_stalled_nodes() {
        let executor = NodeExecutor::new(registry(), Some(Duration::from_millis(5)));
        let node = Node::new("n", "slow", json!({}));

        let err = executor.execute_node(&node, Map::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::NodeTimeout { timeout_ms: 5, .. }));
    }

    #[test]
    fn registry_lists_sorted_types() {
        assert_eq!(registry().types(), vec!["boom", "echo", "slow"]);
        assert!(registry().contains("echo"));
        assert!(!registry().contains("nope"));
    }
}
