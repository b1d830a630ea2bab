//! Bridges domain events to a rendering collaborator and the activity log.

/// Capped activity log.
pub mod log;

/// Rendering collaborator interface.
pub mod renderer;

pub use log::{ActivityLog, LogEntry, Severity};
pub use renderer::{HeadlessRenderer, Renderer};

use crate::config::HighlightPalette;
use crate::events::{GraphEvent, TraversalEvent};
use crate::graph::store::{lock, SharedStore};
use crate::types::{Edge, TraversalMode, DEFAULT_EDGE_COLOR};

/// Reflects store mutations and traversal progress onto a [`Renderer`].
pub struct PresentationAdapter<R: Renderer> {
    renderer: R,
    log: ActivityLog,
    store: SharedStore,
    palette: HighlightPalette,
    edge_color: String,
    mode: TraversalMode,
}

impl<R: Renderer> PresentationAdapter<R> {
    pub fn new(
        renderer: R,
        store: SharedStore,
        palette: HighlightPalette,
        log_capacity: usize,
    ) -> Self {
        Self {
            renderer,
            log: ActivityLog::new(log_capacity),
            store,
            palette,
            edge_color: DEFAULT_EDGE_COLOR.to_string(),
            mode: TraversalMode::Bfs,
        }
    }

    /// Sets the color painted on edges that carry none of their own.
    pub fn with_edge_color(mut self, color: impl Into<String>) -> Self {
        self.edge_color = color.into();
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Appends a message to the activity log.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.log.push(message, severity);
    }

    /// Raises a blocking notice and records it in the log.
    pub fn alert(&mut self, message: &str) {
        self.renderer.alert(message);
        self.log.push(message, Severity::Warning);
    }

    /// Mirrors a store mutation onto the renderer.
    pub fn apply_graph_event(&mut self, event: &GraphEvent) {
        match event {
            GraphEvent::NodeAdded { node } => self.renderer.node_added(node),
            GraphEvent::NodeUpdated { node } => self.renderer.node_updated(node),
            GraphEvent::NodeRemoved { node_id, edge_ids } => {
                let mut stale = self.renderer.connected_edges(*node_id);
                stale.retain(|id| !edge_ids.contains(id));
                for edge_id in edge_ids.iter().chain(&stale) {
                    self.renderer.edge_removed(*edge_id);
                }
                self.renderer.node_removed(*node_id);
            }
            GraphEvent::EdgeAdded { edge } => {
                self.renderer.edge_added(edge);
                self.paint_edge(edge);
            }
            GraphEvent::EdgeUpdated { edge } => {
                self.renderer.edge_updated(edge);
                self.paint_edge(edge);
            }
            GraphEvent::EdgeRemoved { edge_id } => self.renderer.edge_removed(*edge_id),
            GraphEvent::Cleared => self.renderer.cleared(),
            GraphEvent::Replaced { .. } => {
                self.renderer.cleared();
                let store = lock(&self.store);
                for node in store.nodes() {
                    self.renderer.node_added(node);
                }
                let edges = store.edges().to_vec();
                drop(store);
                for edge in &edges {
                    self.renderer.edge_added(edge);
                    self.paint_edge(edge);
                }
                self.renderer.fit();
            }
            GraphEvent::DirectedModeChanged { .. } => {
                let store = lock(&self.store);
                for edge in store.edges() {
                    self.renderer.edge_updated(edge);
                }
            }
        }
    }

    /// Announces a new run; later traversal events are colored for `mode`.
    pub fn begin_traversal(&mut self, mode: TraversalMode) {
        self.mode = mode;
        self.sync_colors();
        self.log.push(format!("Started {}...", mode.label()), Severity::Info);
    }

    /// Mirrors one traversal step onto the renderer and the log.
    pub fn apply_traversal_event(&mut self, event: &TraversalEvent) {
        let mode = self.mode;
        match event {
            TraversalEvent::Visiting {
                node_id,
                highlight_color,
            }
            | TraversalEvent::Visited {
                node_id,
                highlight_color,
            }
            | TraversalEvent::Discovered {
                node_id,
                highlight_color,
            } => {
                let color = self.palette.color_for(*highlight_color, mode);
                self.renderer.set_node_color(*node_id, color);
            }
            TraversalEvent::Progress {
                visited_count,
                frontier_size,
            } => self.log.push(
                format!(
                    "{}: Visited {} nodes, {}: {}",
                    mode.label(),
                    visited_count,
                    mode.frontier_name(),
                    frontier_size
                ),
                Severity::Algorithm,
            ),
            TraversalEvent::Finished {
                visited_count,
                cancelled,
            } => {
                if *cancelled {
                    self.log.push("Algorithm stopped", Severity::Info);
                } else {
                    self.log
                        .push(format!("{} finished", mode.label()), Severity::Success);
                    self.log.push(
                        format!("{} finished. Visited {} nodes.", mode.label(), visited_count),
                        Severity::Algorithm,
                    );
                }
            }
            TraversalEvent::ColorsReset => {
                self.sync_colors();
                self.log.push("Graph colors reset", Severity::Info);
            }
        }
    }

    fn paint_edge(&mut self, edge: &Edge) {
        let color = edge.color.as_deref().unwrap_or(self.edge_color.as_str());
        self.renderer.set_edge_color(edge.id, color);
    }

    /// Pushes every node's current color from the store to the renderer.
    pub fn sync_colors(&mut self) {
        let colors: Vec<_> = lock(&self.store)
            .nodes()
            .iter()
            .map(|n| (n.id, n.color.clone()))
            .collect();
        for (node_id, color) in colors {
            self.renderer.set_node_color(node_id, &color);
        }
    }
}
