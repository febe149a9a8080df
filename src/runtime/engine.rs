/// Graph execution engine
///
/// Validates a workflow snapshot, orders it topologically and walks that
/// order one node at a time. Each step consults gate propagation, resolves
/// inputs from upstream outputs and awaits the node's computation before the
/// next node starts. Independent branches are never run concurrently, so the
/// order in which outputs are published matches the schedule exactly.

use crate::config::EngineConfig;
use crate::runtime::cycle::detect_cycle;
use crate::runtime::error::EngineError;
use crate::runtime::events::{ExecutionEvent, ExecutionObserver};
use crate::runtime::executor::{NodeExecutor, NodeOutcome, NodeRegistry};
use crate::runtime::gate::SkipSet;
use crate::runtime::graph::DependencyGraph;
use crate::runtime::resolver::resolve_inputs;
use crate::runtime::scheduler::topological_order;
use crate::workflow::types::{RunStatus, Workflow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

/// Sequential DAG execution engine
///
/// Owns the engine-wide run status. Only one run may be `PROCESSING` at a
/// time; the engine is shared by reference (`Arc`) rather than reached
/// through a global.
pub struct ExecutionEngine {
    /// Node executor for dispatching computations
    executor: NodeExecutor,
    /// Receiver of status and output events
    observer: Arc<dyn ExecutionObserver>,
    /// Status and results of the current or most recent run
    state: Mutex<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    status: RunStatus,
    outputs: HashMap<String, Value>,
    outcomes: Vec<(String, NodeOutcome)>,
    last_error: Option<String>,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub workflow_id: String,
    /// The execution order that was walked
    pub order: Vec<String>,
    /// Outcome of every node, in execution order
    pub outcomes: Vec<(String, NodeOutcome)>,
    /// Recorded outputs; skipped nodes are absent
    pub outputs: HashMap<String, Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// IDs of nodes pruned by closed gates, in execution order
    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == NodeOutcome::Skipped)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Ephemeral state of one run
///
/// Created fresh at the start of every run and dropped when it ends, so
/// nothing leaks from one run into the next.
struct ExecutionContext<'g> {
    run_id: String,
    /// Node lookup and incoming-edge lookup
    graph: &'g DependencyGraph,
    outputs: HashMap<String, Value>,
    skipped: SkipSet,
    outcomes: Vec<(String, NodeOutcome)>,
}

/// Ends a run in `ERROR` when its future is dropped before completion
///
/// Disarmed with `mem::forget` once the run finishes normally.
struct RunGuard<'e> {
    engine: &'e ExecutionEngine,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.engine.state();
            if state.status != RunStatus::Processing {
                return;
            }
            state.status = RunStatus::Error;
            state.last_error = Some(EngineError::RunAborted.to_string());
        }
        tracing::error!("❌ Run dropped before completion");
        self.engine.publish_status(RunStatus::Error);
    }
}

impl ExecutionEngine {
    /// Create an engine over a fixed computation registry
    pub fn new(registry: NodeRegistry, observer: Arc<dyn ExecutionObserver>, config: &EngineConfig) -> Self {
        Self {
            executor: NodeExecutor::new(registry, config.node_timeout()),
            observer,
            state: Mutex::new(EngineState::default()),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        self.executor.registry()
    }

    pub fn status(&self) -> RunStatus {
        self.state().status
    }

    /// Outputs recorded by the current or most recent run
    pub fn outputs(&self) -> HashMap<String, Value> {
        self.state().outputs.clone()
    }

    /// Node outcomes of the current or most recent run, including a failure
    pub fn outcomes(&self) -> Vec<(String, NodeOutcome)> {
        self.state().outcomes.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Return to `IDLE` and forget the previous run's results
    ///
    /// Refused while a run is in progress.
    pub fn reset(&self) -> Result<(), EngineError> {
        {
            let mut state = self.state();
            if state.status == RunStatus::Processing {
                return Err(EngineError::RunInProgress);
            }
            *state = EngineState::default();
        }
        tracing::info!("🔄 Engine reset");
        self.publish_status(RunStatus::Idle);
        Ok(())
    }

    /// Execute a workflow snapshot
    ///
    /// Refused with `RunInProgress` while another run is processing. Every
    /// structural check (edge endpoints, duplicate IDs, target handles, node
    /// types, cycles) happens before the first node executes. Any error ends
    /// the run with status `ERROR`.
    pub async fn run(&self, workflow: &Workflow) -> Result<RunReport, EngineError> {
        {
            let mut state = self.state();
            if state.status == RunStatus::Processing {
                tracing::warn!("⏸️ Run requested for '{}' while another run is processing", workflow.id);
                return Err(EngineError::RunInProgress);
            }
            *state = EngineState {
                status: RunStatus::Processing,
                ..EngineState::default()
            };
        }
        self.publish_status(RunStatus::Processing);
        let guard = RunGuard { engine: self };

        let workflow_start_time = std::time::Instant::now();
        let result = self.execute_workflow(workflow).await;
        let workflow_duration = workflow_start_time.elapsed();
        std::mem::forget(guard);

        let status = {
            let mut state = self.state();
            match &result {
                Ok(_) => {
                    state.status = RunStatus::Done;
                    tracing::info!("🎉 Workflow '{}' completed in {:?}", workflow.id, workflow_duration);
                }
                Err(e) => {
                    state.status = RunStatus::Error;
                    state.last_error = Some(e.to_string());
                    tracing::error!("❌ Workflow '{}' failed after {:?}: {}", workflow.id, workflow_duration, e);
                }
            }
            state.status
        };
        self.publish_status(status);

        result
    }

    async fn execute_workflow(&self, workflow: &Workflow) -> Result<RunReport, EngineError> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        tracing::info!(
            "🚀 Starting run {} of '{}' ({} nodes, {} edges)",
            run_id,
            workflow.id,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        let graph = DependencyGraph::build(workflow)?;
        self.validate(workflow, &graph)?;
        let order = topological_order(&graph)?;

        let mut context = ExecutionContext {
            run_id,
            graph: &graph,
            outputs: HashMap::new(),
            skipped: SkipSet::new(),
            outcomes: Vec::with_capacity(order.len()),
        };

        for (step_num, node_id) in order.iter().enumerate() {
            tracing::info!("📍 Step {}/{}: '{}'", step_num + 1, order.len(), node_id);
            self.execute_step(&mut context, node_id).await?;
        }

        Ok(RunReport {
            run_id: context.run_id,
            workflow_id: workflow.id.clone(),
            order,
            outcomes: context.outcomes,
            outputs: context.outputs,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Reject structurally invalid graphs before anything executes
    fn validate(&self, workflow: &Workflow, graph: &DependencyGraph) -> Result<(), EngineError> {
        if let Some(cycle) = detect_cycle(&workflow.edges) {
            return Err(EngineError::CycleDetected { cycle });
        }

        if let Some(edge) = workflow.edges.iter().find(|e| e.target_handle.is_none()) {
            return Err(EngineError::MissingTargetHandle {
                edge_id: edge.id.clone(),
            });
        }

        for node_id in graph.node_ids() {
            if let Some(node) = graph.node(node_id) {
                if !self.registry().contains(&node.node_type) {
                    return Err(EngineError::UnknownNodeType {
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                    });
                }
            }
        }

        tracing::debug!("✅ Graph validation successful");
        Ok(())
    }

    async fn execute_step(&self, context: &mut ExecutionContext<'_>, node_id: &str) -> Result<(), EngineError> {
        if context.skipped.is_skipped(node_id) {
            tracing::debug!("⏭️ Skipping '{}' (closed gate upstream)", node_id);
            self.record(context, node_id, NodeOutcome::Skipped);
            self.observer.notify(ExecutionEvent::NodeSkipped {
                run_id: context.run_id.clone(),
                node_id: node_id.to_string(),
            });
            return Ok(());
        }

        let graph = context.graph;
        let Some(node) = graph.node(node_id) else {
            return Ok(());
        };

        let inputs = resolve_inputs(node, graph.incoming_edges(node_id), &context.outputs)?;

        self.observer.notify(ExecutionEvent::NodeStarted {
            run_id: context.run_id.clone(),
            node_id: node_id.to_string(),
        });

        let output = match self.executor.execute_node(node, inputs).await {
            Ok(output) => output,
            Err(e) => {
                self.record(context, node_id, NodeOutcome::Failed(e.to_string()));
                return Err(e);
            }
        };

        context.outputs.insert(node_id.to_string(), output.clone());
        self.state().outputs.insert(node_id.to_string(), output.clone());
        self.record(context, node_id, NodeOutcome::Executed(output.clone()));

        if node.is_gate() {
            context.skipped.apply_gate_output(graph, node_id, &output);
        }

        self.observer.notify(ExecutionEvent::NodeOutput {
            run_id: context.run_id.clone(),
            node_id: node_id.to_string(),
            output,
        });

        Ok(())
    }

    fn record(&self, context: &mut ExecutionContext<'_>, node_id: &str, outcome: NodeOutcome) {
        context.outcomes.push((node_id.to_string(), outcome.clone()));
        self.state().outcomes.push((node_id.to_string(), outcome));
    }

    fn publish_status(&self, status: RunStatus) {
        self.observer.notify(ExecutionEvent::StatusChanged { status });
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // State is plain data; a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
