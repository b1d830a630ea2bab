//! Typed domain events emitted by the store-facing session and by the
//! traversal engine. Rendering adapters subscribe to these instead of wiring
//! themselves into library-specific callbacks.

use serde::Serialize;

use crate::types::{Edge, EdgeId, Highlight, Node, NodeId};

/// A change to the graph's contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GraphEvent {
    NodeAdded { node: Node },
    NodeUpdated { node: Node },
    #[serde(rename_all = "camelCase")]
    NodeRemoved { node_id: NodeId, edge_ids: Vec<EdgeId> },
    EdgeAdded { edge: Edge },
    EdgeUpdated { edge: Edge },
    #[serde(rename_all = "camelCase")]
    EdgeRemoved { edge_id: EdgeId },
    /// Every node and edge is gone.
    Cleared,
    /// The whole graph was swapped out, e.g. by an import.
    #[serde(rename_all = "camelCase")]
    Replaced { node_count: usize, edge_count: usize },
    DirectedModeChanged { directed: bool },
}

/// One step of a traversal run, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TraversalEvent {
    #[serde(rename_all = "camelCase")]
    Visiting {
        node_id: NodeId,
        highlight_color: Highlight,
    },
    #[serde(rename_all = "camelCase")]
    Visited {
        node_id: NodeId,
        highlight_color: Highlight,
    },
    #[serde(rename_all = "camelCase")]
    Discovered {
        node_id: NodeId,
        highlight_color: Highlight,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        visited_count: usize,
        frontier_size: usize,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        visited_count: usize,
        cancelled: bool,
    },
    ColorsReset,
}

impl TraversalEvent {
    /// The node a highlight event refers to, if any.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            TraversalEvent::Visiting { node_id, .. }
            | TraversalEvent::Visited { node_id, .. }
            | TraversalEvent::Discovered { node_id, .. } => Some(*node_id),
            _ => None,
        }
    }
}
