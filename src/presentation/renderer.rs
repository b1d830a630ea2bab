use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{Edge, EdgeId, Node, NodeId};

/// Rendering/layout collaborator driven by the presentation adapter.
///
/// Implementations own how the graph is drawn and laid out; the core only
/// tells them what changed and asks for the current selection.
pub trait Renderer {
    fn node_added(&mut self, node: &Node);
    fn node_updated(&mut self, node: &Node);
    fn node_removed(&mut self, node_id: NodeId);
    fn edge_added(&mut self, edge: &Edge);
    fn edge_updated(&mut self, edge: &Edge);
    fn edge_removed(&mut self, edge_id: EdgeId);
    /// Everything was removed or replaced; redraw from scratch.
    fn cleared(&mut self);

    /// Changes only the displayed color of a node.
    fn set_node_color(&mut self, node_id: NodeId, color: &str);
    fn set_edge_color(&mut self, edge_id: EdgeId, color: &str);

    /// Fits and centers the view on the whole graph.
    fn fit(&mut self);

    /// Shows a notice the user has to acknowledge.
    fn alert(&mut self, message: &str);

    /// Nodes currently selected in the view.
    fn selected_nodes(&self) -> Vec<NodeId> {
        Vec::new()
    }

    /// Edge ids the view currently draws attached to `node_id`.
    fn connected_edges(&self, _node_id: NodeId) -> Vec<EdgeId> {
        Vec::new()
    }
}

/// Renderer with no display; reports what would be drawn through `tracing`.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    selection: Vec<NodeId>,
    edge_colors: HashMap<EdgeId, String>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection reported by [`Renderer::selected_nodes`].
    pub fn select(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes;
    }

    /// Last color painted on an edge that is still drawn.
    pub fn edge_color(&self, edge_id: EdgeId) -> Option<&str> {
        self.edge_colors.get(&edge_id).map(String::as_str)
    }
}

impl Renderer for HeadlessRenderer {
    fn node_added(&mut self, node: &Node) {
        debug!(node_id = node.id, label = %node.label, "draw node");
    }

    fn node_updated(&mut self, node: &Node) {
        debug!(node_id = node.id, label = %node.label, color = %node.color, "redraw node");
    }

    fn node_removed(&mut self, node_id: NodeId) {
        self.selection.retain(|&id| id != node_id);
        debug!(node_id, "erase node");
    }

    fn edge_added(&mut self, edge: &Edge) {
        debug!(edge_id = edge.id, from = edge.from, to = edge.to, "draw edge");
    }

    fn edge_updated(&mut self, edge: &Edge) {
        debug!(edge_id = edge.id, "redraw edge");
    }

    fn edge_removed(&mut self, edge_id: EdgeId) {
        self.edge_colors.remove(&edge_id);
        debug!(edge_id, "erase edge");
    }

    fn cleared(&mut self) {
        self.selection.clear();
        self.edge_colors.clear();
        debug!("clear canvas");
    }

    fn set_node_color(&mut self, node_id: NodeId, color: &str) {
        debug!(node_id, color, "paint node");
    }

    fn set_edge_color(&mut self, edge_id: EdgeId, color: &str) {
        self.edge_colors.insert(edge_id, color.to_string());
        debug!(edge_id, color, "paint edge");
    }

    fn fit(&mut self) {
        debug!("fit view");
    }

    fn alert(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.clone()
    }
}
