use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::errors::{GraphError, Result};
use crate::types::*;

/// Store handle shared between the editor session and a running traversal.
pub type SharedStore = Arc<Mutex<GraphStore>>;

/// Wraps a store for sharing.
pub fn shared(store: GraphStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store. A poisoned lock still holds consistent records
/// (every mutation is a single push/remove), so the guard is recovered.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, GraphStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory owner of every node and edge, kept in insertion order.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_counter: u64,
    edge_counter: u64,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

impl GraphStore {
    /// Creates an empty store with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node with the next id. Unlabelled nodes become `"Node {id}"`.
    pub fn add_node(&mut self, spec: NodeSpec) -> Node {
        self.node_counter += 1;
        let id = self.node_counter;
        let color = spec
            .color
            .unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string());
        let node = Node {
            id,
            label: spec.label.unwrap_or_else(|| format!("Node {id}")),
            base_color: color.clone(),
            color,
            position: spec.position,
        };
        self.nodes.push(node.clone());
        debug!(node_id = id, "node added");
        node
    }

    /// Applies `update` to an existing node and returns the new record.
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> Result<Node> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::validation(format!("node {id} does not exist")))?;
        if let Some(label) = update.label {
            node.label = label;
        }
        if let Some(color) = update.color {
            node.base_color = color.clone();
            node.color = color;
        }
        if update.position.is_some() {
            node.position = update.position;
        }
        Ok(node.clone())
    }

    /// Removes a node together with every edge touching it.
    ///
    /// Returns the removed node and edges, or `None` if the id is unknown.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, Vec<Edge>)> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.touches(id));
        self.edges = kept;
        debug!(node_id = id, cascaded = removed.len(), "node removed");
        Some((node, removed))
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sets the displayed color of a node, leaving its base color alone.
    ///
    /// Returns `false` if the node no longer exists.
    pub fn set_node_color(&mut self, id: NodeId, color: &str) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.color = color.to_string();
                true
            }
            None => false,
        }
    }

    /// Restores every node's displayed color to its base color.
    pub fn reset_colors(&mut self) {
        for node in &mut self.nodes {
            if node.color != node.base_color {
                node.color = node.base_color.clone();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

impl GraphStore {
    /// Adds an edge with the next id. Endpoints are not checked.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, spec: EdgeSpec) -> Edge {
        self.edge_counter += 1;
        let edge = Edge {
            id: self.edge_counter,
            from,
            to,
            directed: spec.directed,
            label: spec.label,
            weight: spec.weight,
            color: spec.color,
        };
        self.edges.push(edge.clone());
        debug!(edge_id = edge.id, from, to, "edge added");
        edge
    }

    /// Creates an edge the way a user does: no self-loops and no duplicates.
    ///
    /// An edge is a duplicate if `from → to` already exists, or, when
    /// `directed` is false, if `to → from` exists.
    pub fn connect(&mut self, from: NodeId, to: NodeId, directed: bool) -> Result<Edge> {
        if from == to {
            return Err(GraphError::validation("cannot connect node to itself"));
        }
        if self.has_edge_between(from, to, directed) {
            return Err(GraphError::validation(format!(
                "edge between nodes {from} and {to} already exists"
            )));
        }
        Ok(self.add_edge(
            from,
            to,
            EdgeSpec {
                directed,
                ..EdgeSpec::default()
            },
        ))
    }

    /// Connects every pair of nodes that has no edge yet.
    ///
    /// Pairs are visited in node insertion order. In directed mode each new
    /// pair also gets the reverse edge.
    pub fn connect_all(&mut self, directed: bool) -> Vec<Edge> {
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        let mut created = Vec::new();
        for (i, &from) in ids.iter().enumerate() {
            for &to in &ids[i + 1..] {
                if self.has_edge_between(from, to, directed) {
                    continue;
                }
                let spec = EdgeSpec {
                    directed,
                    ..EdgeSpec::default()
                };
                created.push(self.add_edge(from, to, spec.clone()));
                if directed {
                    created.push(self.add_edge(to, from, spec));
                }
            }
        }
        created
    }

    /// Applies `update` to an existing edge and returns the new record.
    pub fn update_edge(&mut self, id: EdgeId, update: EdgeUpdate) -> Result<Edge> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| GraphError::validation(format!("edge {id} does not exist")))?;
        if let Some(weight) = update.weight {
            edge.weight = Some(weight);
            edge.label = Some(weight.to_string());
        }
        if let Some(label) = update.label.filter(|l| !l.is_empty()) {
            edge.label = Some(label);
        }
        if update.color.is_some() {
            edge.color = update.color;
        }
        Ok(edge.clone())
    }

    /// Removes an edge, returning it if it existed.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(index))
    }

    /// Drops every edge and returns how many there were.
    pub fn remove_all_edges(&mut self) -> usize {
        let count = self.edges.len();
        self.edges.clear();
        count
    }

    /// Rewrites the directed flag of every edge; returns how many changed.
    pub fn set_all_directed(&mut self, directed: bool) -> usize {
        let mut changed = 0;
        for edge in self.edges.iter_mut().filter(|e| e.directed != directed) {
            edge.directed = directed;
            changed += 1;
        }
        changed
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges touching `node_id`, in insertion order.
    pub fn incident_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(node_id)).collect()
    }

    /// Nodes reachable from `current` in one step, in edge insertion order.
    ///
    /// With `directed`, only edges leaving `current` are followed; otherwise
    /// the far endpoint of every incident edge is taken regardless of the
    /// edge's own flag. Endpoints that are not nodes of this store are
    /// skipped.
    pub fn neighbors(&self, current: NodeId, directed: bool) -> Vec<NodeId> {
        self.incident_edges(current)
            .into_iter()
            .filter_map(|edge| {
                if edge.from == current {
                    Some(edge.to)
                } else if directed {
                    None
                } else {
                    Some(edge.from)
                }
            })
            .filter(|&target| {
                let known = self.contains_node(target);
                if !known {
                    debug!(node_id = current, target, "skipping dangling edge endpoint");
                }
                known
            })
            .collect()
    }

    fn has_edge_between(&self, from: NodeId, to: NodeId, directed: bool) -> bool {
        self.edges.iter().any(|e| {
            (e.from == from && e.to == to) || (!directed && e.from == to && e.to == from)
        })
    }
}

// ---------------------------------------------------------------------------
// Whole-graph operations
// ---------------------------------------------------------------------------

impl GraphStore {
    /// Empties both collections and resets both counters to zero.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_counter = 0;
        self.edge_counter = 0;
    }

    /// Last node id handed out.
    pub fn node_counter(&self) -> u64 {
        self.node_counter
    }

    /// Last edge id handed out.
    pub fn edge_counter(&self) -> u64 {
        self.edge_counter
    }

    /// Copies every record and both counters.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            node_counter: self.node_counter,
            edge_counter: self.edge_counter,
        }
    }

    /// Replaces the entire contents with `snapshot`.
    ///
    /// Node and edge ids must each be unique; on failure the store is left
    /// untouched.
    pub fn restore(&mut self, snapshot: GraphSnapshot) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(dup) = snapshot.nodes.iter().find(|n| !seen.insert(n.id)) {
            return Err(GraphError::ImportStructure {
                message: format!("duplicate node id {}", dup.id),
            });
        }
        seen.clear();
        if let Some(dup) = snapshot.edges.iter().find(|e| !seen.insert(e.id)) {
            return Err(GraphError::ImportStructure {
                message: format!("duplicate edge id {}", dup.id),
            });
        }

        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.node_counter = snapshot.node_counter;
        self.edge_counter = snapshot.edge_counter;
        Ok(())
    }

    /// Summary counts, including edges with a missing endpoint.
    pub fn stats(&self) -> GraphStats {
        let dangling_edge_count = self
            .edges
            .iter()
            .filter(|e| !self.contains_node(e.from) || !self.contains_node(e.to))
            .count();
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            directed_edge_count: self.edges.iter().filter(|e| e.directed).count(),
            node_counter: self.node_counter,
            edge_counter: self.edge_counter,
            dangling_edge_count,
        }
    }
}
