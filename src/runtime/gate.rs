/// Gate propagation
///
/// Tracks the nodes a run must not execute. The set grows online: each time a
/// gate's output resolves to `false`, the gate's children and everything
/// downstream of them over data edges are pruned. Pruning is a normal branch
/// outcome, never a failure.

use crate::runtime::graph::DependencyGraph;
use serde_json::Value;
use std::collections::HashSet;

/// Node IDs a run deliberately does not execute
#[derive(Debug, Default, Clone)]
pub struct SkipSet {
    skipped: HashSet<String>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_skipped(&self, node_id: &str) -> bool {
        self.skipped.contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Apply a gate's computed output
    ///
    /// Only an output of exactly `false` prunes; any other value (including
    /// `null` and falsy numbers or strings) leaves the children runnable.
    /// Returns the IDs added by this call.
    pub fn apply_gate_output(
        &mut self,
        graph: &DependencyGraph,
        gate_id: &str,
        output: &Value,
    ) -> Vec<String> {
        if *output != Value::Bool(false) {
            return Vec::new();
        }

        let mut added = Vec::new();
        for child in graph.children_of(gate_id) {
            self.insert(child, &mut added);
            for dependent in graph.data_reachable_from(child) {
                self.insert(dependent, &mut added);
            }
        }

        tracing::debug!("Gate '{}' is closed, skipping {:?}", gate_id, added);
        added
    }

    fn insert(&mut self, node_id: &str, added: &mut Vec<String>) {
        if self.skipped.insert(node_id.to_string()) {
            added.push(node_id.to_string());
        }
    }
}
