/// Cycle detection over explicit edges
///
/// Classic white/gray/black depth-first search. A run calls this before
/// anything executes; a cycle aborts the whole run.

use crate::workflow::types::Edge;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Find a cycle in the edge set
///
/// Returns `None` iff the edges are acyclic. Otherwise returns the node IDs of
/// one real cycle in traversal order, starting at the node that was re-entered
/// (e.g. `["A", "B", "C"]` for `A -> B -> C -> A`). Not necessarily minimal.
pub fn detect_cycle(edges: &[Edge]) -> Option<Vec<String>> {
    let mut roots: Vec<&str> = Vec::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in edges {
        for id in [edge.source.as_str(), edge.target.as_str()] {
            if !adjacency.contains_key(id) {
                adjacency.insert(id, Vec::new());
                roots.push(id);
            }
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut marks: HashMap<&str, Mark> = roots.iter().map(|id| (*id, Mark::White)).collect();

    for &root in &roots {
        if marks[root] != Mark::White {
            continue;
        }

        // Each frame is (node, index of the next neighbour to visit).
        // Gray nodes are exactly the nodes on this stack.
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::Gray);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let neighbours = &adjacency[node];

            if frame.1 >= neighbours.len() {
                marks.insert(node, Mark::Black);
                stack.pop();
                continue;
            }

            let next = neighbours[frame.1];
            frame.1 += 1;

            match marks[next] {
                Mark::White => {
                    marks.insert(next, Mark::Gray);
                    stack.push((next, 0));
                }
                Mark::Gray => {
                    let start = stack
                        .iter()
                        .position(|(id, _)| *id == next)
                        .unwrap_or(0);
                    let cycle: Vec<String> =
                        stack[start..].iter().map(|(id, _)| id.to_string()).collect();
                    tracing::debug!("Back edge '{}' -> '{}' closes cycle {:?}", node, next, cycle);
                    return Some(cycle);
                }
                Mark::Black => {}
            }
        }
    }

    None
}
