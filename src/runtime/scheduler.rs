/// Topological scheduler
///
/// Kahn's algorithm over the union of explicit data edges and implicit
/// gate -> child edges. Ready nodes are taken in FIFO order, seeded in node
/// declaration order. Beyond satisfying every dependency, the relative order
/// of independent nodes is intentionally unspecified and must not be relied on.

use crate::runtime::error::EngineError;
use crate::runtime::graph::DependencyGraph;
use std::collections::{HashMap, VecDeque};

/// Compute one valid execution order covering every node
///
/// Fails with `CycleDetected` listing the unscheduled nodes when the order
/// cannot cover the graph. That only happens when an implicit gate edge
/// closes a loop the explicit-edge detector cannot see.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>, EngineError> {
    let mut in_degree: HashMap<&str, usize> =
        graph.node_ids().iter().map(|id| (id.as_str(), 0)).collect();

    for id in graph.node_ids() {
        for dependent in graph.adjacency(id) {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = graph
        .node_ids()
        .iter()
        .map(String::as_str)
        .filter(|id| in_degree[id] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(node_id) = queue.pop_front() {
        order.push(node_id.to_string());

        for dependent in graph.adjacency(node_id) {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if order.len() < graph.len() {
        let cycle: Vec<String> = graph
            .node_ids()
            .iter()
            .filter(|id| in_degree[id.as_str()] > 0)
            .cloned()
            .collect();
        tracing::error!("Scheduler could not order nodes {:?}", cycle);
        return Err(EngineError::CycleDetected { cycle });
    }

    tracing::debug!("Execution order: {:?}", order);
    Ok(order)
}
