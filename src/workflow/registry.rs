/// Hot-swappable graph provider using ArcSwap
///
/// Holds the editor's current workflow graph. Every edit swaps the whole
/// snapshot pointer, so a run that loaded a snapshot keeps reading the exact
/// graph it started with while the editor continues to make changes.

use crate::workflow::types::Workflow;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Lock-free holder of the current workflow snapshot
#[derive(Debug)]
pub struct GraphProvider {
    /// Atomic pointer to the latest workflow graph
    current: ArcSwap<Workflow>,
}

impl GraphProvider {
    /// Create a provider seeded with the given workflow
    pub fn new(workflow: Workflow) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(workflow)),
        }
    }

    /// Replace the current graph (editor mutation)
    pub fn store(&self, workflow: Workflow) {
        tracing::debug!(
            "Storing workflow '{}' with {} nodes and {} edges",
            workflow.id,
            workflow.nodes.len(),
            workflow.edges.len()
        );
        self.current.store(Arc::new(workflow));
    }

    /// Take an immutable snapshot for a run
    ///
    /// The returned `Arc` is unaffected by later `store` calls.
    pub fn snapshot(&self) -> Arc<Workflow> {
        self.current.load_full()
    }
}

impl Default for GraphProvider {
    fn default() -> Self {
        Self::new(Workflow::default())
    }
}
