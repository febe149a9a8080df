/// Petgraph-backed dependency graph
///
/// Turns the flat node/edge lists of a workflow snapshot into the lookups a
/// run needs: adjacency over explicit and implicit edges, the incoming edges
/// of every node in insertion order, and each node's gate parent.

use crate::runtime::error::EngineError;
use crate::workflow::types::{Edge, Node, Workflow};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// Why one node depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Explicit data edge drawn in the editor
    Data,
    /// Implicit ordering edge from a gate to a node nested inside it
    Gate,
}

/// Dependency graph for a single run
///
/// Every node of the snapshot is present even when it has no edges, so
/// isolated nodes are still scheduled and executed.
#[derive(Debug)]
pub struct DependencyGraph {
    /// The petgraph DiGraph structure, weighted by dependency kind
    graph: DiGraph<String, DependencyKind>,
    /// Mapping from node ID to graph node index
    node_id_to_index: HashMap<String, NodeIndex>,
    /// Node lookup by ID
    nodes: HashMap<String, Node>,
    /// Node IDs in declaration order
    declared: Vec<String>,
    /// Incoming data edges per target, in edge-list order
    incoming: HashMap<String, Vec<Edge>>,
    /// Child ID -> gate parent ID, only when the parent is a gate
    gate_parent: HashMap<String, String>,
}

impl DependencyGraph {
    /// Build the dependency graph from a workflow snapshot
    ///
    /// Fails on duplicate node IDs and on edges whose endpoints are unknown.
    pub fn build(workflow: &Workflow) -> Result<Self, EngineError> {
        tracing::debug!(
            "Building dependency graph for '{}' ({} nodes, {} edges)",
            workflow.id,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        let mut graph = DiGraph::new();
        let mut node_id_to_index = HashMap::new();
        let mut nodes = HashMap::new();
        let mut declared = Vec::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            if nodes.contains_key(&node.id) {
                return Err(EngineError::DuplicateNodeId(node.id.clone()));
            }
            let index = graph.add_node(node.id.clone());
            node_id_to_index.insert(node.id.clone(), index);
            nodes.insert(node.id.clone(), node.clone());
            declared.push(node.id.clone());
        }

        let mut incoming: HashMap<String, Vec<Edge>> = HashMap::new();
        for edge in &workflow.edges {
            let from = lookup_endpoint(&node_id_to_index, edge, &edge.source)?;
            let to = lookup_endpoint(&node_id_to_index, edge, &edge.target)?;
            graph.add_edge(from, to, DependencyKind::Data);
            incoming
                .entry(edge.target.clone())
                .or_default()
                .push(edge.clone());
        }

        let mut gate_parent = HashMap::new();
        for node in &workflow.nodes {
            let Some(parent_id) = node.parent_id.as_deref() else {
                continue;
            };
            let Some(parent) = nodes.get(parent_id) else {
                continue;
            };
            if !parent.is_gate() {
                continue;
            }

            gate_parent.insert(node.id.clone(), parent_id.to_string());
            let gate_index = node_id_to_index[parent_id];
            let child_index = node_id_to_index[&node.id];
            // An explicit edge already orders the pair
            if graph.find_edge(gate_index, child_index).is_none() {
                graph.add_edge(gate_index, child_index, DependencyKind::Gate);
                tracing::debug!("Implicit gate edge: '{}' -> '{}'", parent_id, node.id);
            }
        }

        Ok(Self {
            graph,
            node_id_to_index,
            nodes,
            declared,
            incoming,
            gate_parent,
        })
    }

    /// Node IDs in declaration order
    pub fn node_ids(&self) -> &[String] {
        &self.declared
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Nodes that depend on `node_id` through an explicit or implicit edge
    ///
    /// Returned in edge insertion order. Parallel edges appear once per edge.
    pub fn adjacency(&self, node_id: &str) -> Vec<&str> {
        let Some(&index) = self.node_id_to_index.get(node_id) else {
            return Vec::new();
        };
        // petgraph yields outgoing edges newest first
        let mut targets: Vec<&str> = self
            .graph
            .edges(index)
            .map(|e| self.graph[e.target()].as_str())
            .collect();
        targets.reverse();
        targets
    }

    /// Incoming data edges of `node_id` in edge-list order
    pub fn incoming_edges(&self, node_id: &str) -> &[Edge] {
        self.incoming
            .get(node_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Gate this node is nested in, if its parent is a gate
    pub fn rule_gate_parent(&self, node_id: &str) -> Option<&str> {
        self.gate_parent.get(node_id).map(String::as_str)
    }

    /// Nodes whose `parent_id` is `gate_id`, in declaration order
    pub fn children_of(&self, gate_id: &str) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|id| {
                self.nodes
                    .get(id.as_str())
                    .and_then(|n| n.parent_id.as_deref())
                    == Some(gate_id)
            })
            .map(String::as_str)
            .collect()
    }

    /// All nodes transitively reachable from `node_id` over data edges
    ///
    /// The start node itself is not included.
    pub fn data_reachable_from(&self, node_id: &str) -> Vec<&str> {
        let Some(&start) = self.node_id_to_index.get(node_id) else {
            return Vec::new();
        };

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut reachable = Vec::new();

        while let Some(current) = queue.pop_front() {
            for edge in self.graph.edges(current) {
                if *edge.weight() != DependencyKind::Data {
                    continue;
                }
                let target = edge.target();
                if seen.insert(target) {
                    reachable.push(self.graph[target].as_str());
                    queue.push_back(target);
                }
            }
        }

        reachable
    }
}

fn lookup_endpoint(
    index: &HashMap<String, NodeIndex>,
    edge: &Edge,
    node_id: &str,
) -> Result<NodeIndex, EngineError> {
    index
        .get(node_id)
        .copied()
        .ok_or_else(|| EngineError::UnknownEdgeEndpoint {
            edge_id: edge.id.clone(),
            node_id: node_id.to_string(),
        })
}
