use serde::{Deserialize, Serialize};

/// Identifier of a node, handed out by the store's node counter.
pub type NodeId = u64;

/// Identifier of an edge, handed out by the store's edge counter.
pub type EdgeId = u64;

/// Color given to new nodes and to imported nodes without one.
pub const DEFAULT_NODE_COLOR: &str = "#3498db";

/// Color shown for edges that carry no color of their own.
pub const DEFAULT_EDGE_COLOR: &str = "#848484";

/// Traversal discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    Bfs,
    Dfs,
}

#[allow(clippy::should_implement_trait)]
impl TraversalMode {
    /// Returns the string representation of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalMode::Bfs => "bfs",
            TraversalMode::Dfs => "dfs",
        }
    }

    /// Parses a string into a `TraversalMode`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<TraversalMode> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Some(TraversalMode::Bfs),
            "dfs" => Some(TraversalMode::Dfs),
            _ => None,
        }
    }

    /// Upper-case name used in activity messages ("BFS", "DFS").
    pub fn label(&self) -> &'static str {
        match self {
            TraversalMode::Bfs => "BFS",
            TraversalMode::Dfs => "DFS",
        }
    }

    /// What the pending set is called for this mode.
    pub fn frontier_name(&self) -> &'static str {
        match self {
            TraversalMode::Bfs => "Queue",
            TraversalMode::Dfs => "Stack",
        }
    }
}

/// Semantic highlight applied to a node while a traversal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    InProgress,
    Done,
    Frontier,
}

impl Highlight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Highlight::InProgress => "in-progress",
            Highlight::Done => "done",
            Highlight::Frontier => "frontier",
        }
    }
}

/// Advisory layout position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node of the edited graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// Color currently displayed; traversal highlighting writes here.
    pub color: String,
    /// Assigned color that `color` returns to after highlighting.
    pub base_color: String,
    pub position: Option<Position>,
}

/// An edge of the edited graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub directed: bool,
    pub label: Option<String>,
    pub weight: Option<f64>,
    pub color: Option<String>,
}

impl Edge {
    /// Returns `true` if the edge touches `node_id` at either end.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Immutable point-in-time copy of every node, edge and both id counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub node_counter: u64,
    pub edge_counter: u64,
}

/// Attributes for a node about to be created. Unset fields get defaults.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub label: Option<String>,
    pub color: Option<String>,
    pub position: Option<Position>,
}

/// Changes applied by `update_node`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub label: Option<String>,
    /// Sets both the displayed and the base color.
    pub color: Option<String>,
    pub position: Option<Position>,
}

/// Attributes for an edge about to be created.
#[derive(Debug, Clone, Default)]
pub struct EdgeSpec {
    pub directed: bool,
    pub label: Option<String>,
    pub weight: Option<f64>,
    pub color: Option<String>,
}

/// Changes applied by `update_edge`.
#[derive(Debug, Clone, Default)]
pub struct EdgeUpdate {
    /// Also becomes the label unless `label` is given.
    pub weight: Option<f64>,
    pub label: Option<String>,
    /// Replaces the edge color when given; `None` keeps the current color.
    pub color: Option<String>,
}

/// Counts reported by `stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub directed_edge_count: usize,
    pub node_counter: u64,
    pub edge_counter: u64,
    /// Edges whose endpoints are not both present in the store.
    pub dangling_edge_count: usize,
}
