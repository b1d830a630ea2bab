use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{EditorConfig, TraversalTiming};
use crate::errors::{GraphError, Result};
use crate::events::GraphEvent;
use crate::graph::store::{lock, shared, GraphStore, SharedStore};
use crate::graph::{TraversalEngine, TraversalRequest, TraversalRun, TraversalSummary};
use crate::presentation::{ActivityLog, PresentationAdapter, Renderer, Severity};
use crate::serializer::{self, ExportFormat};
use crate::types::*;

/// Pointer interaction reported by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click {
        node: Option<NodeId>,
        edge: Option<EdgeId>,
    },
    DoubleClick {
        node: Option<NodeId>,
        edge: Option<EdgeId>,
    },
    RightClick,
    EdgeSelected(EdgeId),
    DeselectAll,
}

/// What the session did in response to an [`Interaction`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Ignored,
    /// First click of click-to-connect: the node is now the edge source.
    SourceSelected(NodeId),
    Deselected,
    EdgeCreated(Edge),
    /// The UI should open the node form pre-filled with this record.
    EditNode(Node),
    /// The UI should open the edge form pre-filled with this record; an
    /// edge without a color carries the default edge color.
    EditEdge(Edge),
    /// Description of the selected edge, e.g. `Edge: A → B (weight: 2)`.
    EdgeInfo(String),
}

/// Session object owning the graph, the traversal engine, the directed-mode
/// toggle and the presentation side. Every user action goes through here;
/// failures are logged and returned, never fatal.
pub struct GraphEditor<R: Renderer> {
    store: SharedStore,
    engine: TraversalEngine,
    adapter: PresentationAdapter<R>,
    config: EditorConfig,
    timing: Option<TraversalTiming>,
    directed: bool,
    edge_source: Option<NodeId>,
}

// ---------------------------------------------------------------------------
// Lifecycle and accessors
// ---------------------------------------------------------------------------

impl<R: Renderer> GraphEditor<R> {
    /// Creates a session with an empty graph.
    pub fn new(renderer: R, config: EditorConfig) -> Self {
        let store = shared(GraphStore::new());
        let engine = TraversalEngine::new(store.clone(), config.palette.clone());
        let adapter = PresentationAdapter::new(
            renderer,
            store.clone(),
            config.palette.clone(),
            config.log_capacity,
        )
        .with_edge_color(config.default_edge_color.clone());
        Self {
            store,
            engine,
            adapter,
            directed: config.directed,
            config,
            timing: None,
            edge_source: None,
        }
    }

    /// Handle onto the shared store.
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        lock(&self.store).snapshot()
    }

    pub fn stats(&self) -> GraphStats {
        lock(&self.store).stats()
    }

    /// The traversal engine; clone it to stop a run from another task.
    pub fn engine(&self) -> &TraversalEngine {
        &self.engine
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn log(&self) -> &ActivityLog {
        self.adapter.log()
    }

    pub fn renderer(&self) -> &R {
        self.adapter.renderer()
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        self.adapter.renderer_mut()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Changes the traversal speed preset used by later runs.
    pub fn set_speed(&mut self, speed: u8) {
        self.config.speed = speed;
        self.timing = None;
        self.adapter.notify(
            format!("Speed set to {}", crate::config::speed_name(speed)),
            Severity::Info,
        );
    }

    /// Overrides the timing derived from the speed preset for later runs.
    pub fn set_timing(&mut self, timing: TraversalTiming) {
        self.timing = Some(timing);
    }

    /// Timing the next traversal will use.
    pub fn timing(&self) -> TraversalTiming {
        self.timing.unwrap_or_else(|| self.config.timing())
    }

    fn publish(&mut self, event: GraphEvent) {
        self.adapter.apply_graph_event(&event);
    }

    fn report(&mut self, error: &GraphError, severity: Severity) {
        warn!(%error, "action failed");
        self.adapter.notify(error.to_string(), severity);
    }
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

impl<R: Renderer> GraphEditor<R> {
    /// Adds a node labelled `Node {id}` in the default color.
    pub fn add_node(&mut self) -> Node {
        let spec = NodeSpec {
            color: Some(self.config.default_node_color.clone()),
            ..NodeSpec::default()
        };
        let node = lock(&self.store).add_node(spec);
        self.adapter
            .notify(format!("Added node: {}", node.label), Severity::Info);
        self.publish(GraphEvent::NodeAdded { node: node.clone() });
        node
    }

    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> Result<Node> {
        let result = lock(&self.store).update_node(id, update);
        match result {
            Ok(node) => {
                self.adapter
                    .notify(format!("Updated node: {}", node.label), Severity::Info);
                self.publish(GraphEvent::NodeUpdated { node: node.clone() });
                Ok(node)
            }
            Err(e) => {
                self.report(&e, Severity::Error);
                Err(e)
            }
        }
    }

    /// Returns the first selected node for editing; alerts if none is selected.
    pub fn edit_selected_node(&mut self) -> Result<Node> {
        let selected = self.adapter.renderer().selected_nodes();
        let node = selected
            .first()
            .and_then(|&id| lock(&self.store).get_node(id).cloned());
        match node {
            Some(node) => Ok(node),
            None => {
                self.adapter.alert("Select a node to edit");
                Err(GraphError::validation("no node selected"))
            }
        }
    }

    /// Deletes a node and its incident edges. Unknown ids are a no-op.
    pub fn delete_node(&mut self, id: NodeId) -> Option<Node> {
        let (node, edges) = lock(&self.store).remove_node(id)?;
        if self.edge_source == Some(id) {
            self.edge_source = None;
        }
        self.adapter
            .notify("Removed node and related edges", Severity::Info);
        self.publish(GraphEvent::NodeRemoved {
            node_id: id,
            edge_ids: edges.iter().map(|e| e.id).collect(),
        });
        Some(node)
    }

    /// Creates an edge in the current directed mode.
    ///
    /// Self-loops and duplicates are rejected with a validation error.
    pub fn create_edge(&mut self, from: NodeId, to: NodeId) -> Result<Edge> {
        let result = lock(&self.store).connect(from, to, self.directed);
        match result {
            Ok(edge) => {
                self.adapter.notify(
                    format!("Created edge between nodes {from} and {to}"),
                    Severity::Success,
                );
                self.publish(GraphEvent::EdgeAdded { edge: edge.clone() });
                Ok(edge)
            }
            Err(e) => {
                self.report(&e, Severity::Warning);
                Err(e)
            }
        }
    }

    pub fn update_edge(&mut self, id: EdgeId, update: EdgeUpdate) -> Result<Edge> {
        let result = lock(&self.store).update_edge(id, update);
        match result {
            Ok(edge) => {
                self.adapter.notify("Updated edge", Severity::Info);
                self.publish(GraphEvent::EdgeUpdated { edge: edge.clone() });
                Ok(edge)
            }
            Err(e) => {
                self.report(&e, Severity::Error);
                Err(e)
            }
        }
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = lock(&self.store).remove_edge(id)?;
        self.adapter.notify("Removed edge", Severity::Info);
        self.publish(GraphEvent::EdgeRemoved { edge_id: id });
        Some(edge)
    }

    /// Switches directed mode and applies it to every existing edge.
    pub fn set_directed(&mut self, directed: bool) {
        self.directed = directed;
        lock(&self.store).set_all_directed(directed);
        let mode = if directed { "directed" } else { "undirected" };
        self.adapter
            .notify(format!("Switched to {mode} edges"), Severity::Info);
        self.publish(GraphEvent::DirectedModeChanged { directed });
    }

    /// Connects every pair of nodes that is not connected yet.
    pub fn connect_all_nodes(&mut self) -> Vec<Edge> {
        if lock(&self.store).node_count() < 2 {
            self.adapter
                .notify("Need at least 2 nodes to create connections", Severity::Warning);
            return Vec::new();
        }
        let created = lock(&self.store).connect_all(self.directed);
        self.adapter.notify(
            format!("Connected all nodes. Added {} new edges", created.len()),
            Severity::Success,
        );
        for edge in &created {
            self.publish(GraphEvent::EdgeAdded { edge: edge.clone() });
        }
        created
    }

    /// Removes every edge, keeping the nodes. Returns how many were removed.
    pub fn remove_all_edges(&mut self) -> usize {
        let ids: Vec<EdgeId> = lock(&self.store).edges().iter().map(|e| e.id).collect();
        if ids.is_empty() {
            self.adapter.notify("No edges to remove", Severity::Info);
            return 0;
        }
        let count = lock(&self.store).remove_all_edges();
        self.adapter
            .notify(format!("Removed all {count} edges"), Severity::Info);
        for edge_id in ids {
            self.publish(GraphEvent::EdgeRemoved { edge_id });
        }
        count
    }

    /// Empties the graph and resets both id counters.
    pub fn clear(&mut self) {
        lock(&self.store).clear();
        self.edge_source = None;
        self.adapter.notify("Graph cleared", Severity::Info);
        self.publish(GraphEvent::Cleared);
    }

    /// Fits the view around the whole graph.
    pub fn center(&mut self) {
        self.adapter.renderer_mut().fit();
        self.adapter.notify("Graph centered", Severity::Info);
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

impl<R: Renderer> GraphEditor<R> {
    /// Reacts to a pointer interaction on the canvas.
    ///
    /// Clicking a node selects it as edge source; clicking it again
    /// deselects it, clicking another node connects the two, and clicking
    /// empty space drops the selection.
    pub fn handle_interaction(&mut self, interaction: Interaction) -> InteractionOutcome {
        match interaction {
            Interaction::Click {
                node: Some(node),
                edge: None,
            } => self.click_node(node),
            Interaction::Click { edge: Some(_), .. } => InteractionOutcome::Ignored,
            Interaction::Click {
                node: None,
                edge: None,
            } => {
                if self.edge_source.is_some() {
                    self.drop_edge_source();
                    InteractionOutcome::Deselected
                } else {
                    InteractionOutcome::Ignored
                }
            }
            Interaction::DoubleClick {
                node: Some(node), ..
            } => match lock(&self.store).get_node(node) {
                Some(node) => InteractionOutcome::EditNode(node.clone()),
                None => InteractionOutcome::Ignored,
            },
            Interaction::DoubleClick {
                node: None,
                edge: Some(edge),
            } => match lock(&self.store).get_edge(edge) {
                Some(edge) => {
                    let mut form = edge.clone();
                    form.color.get_or_insert_with(|| self.config.default_edge_color.clone());
                    InteractionOutcome::EditEdge(form)
                }
                None => InteractionOutcome::Ignored,
            },
            Interaction::DoubleClick {
                node: None,
                edge: None,
            }
            | Interaction::RightClick => InteractionOutcome::Ignored,
            Interaction::EdgeSelected(edge_id) => match self.describe_edge(edge_id) {
                Some(info) => InteractionOutcome::EdgeInfo(info),
                None => InteractionOutcome::Ignored,
            },
            Interaction::DeselectAll => {
                self.adapter.notify("No element selected", Severity::Info);
                InteractionOutcome::Ignored
            }
        }
    }

    fn click_node(&mut self, node: NodeId) -> InteractionOutcome {
        match self.edge_source {
            None => {
                self.edge_source = Some(node);
                let color = self.config.palette.in_progress.clone();
                lock(&self.store).set_node_color(node, &color);
                self.adapter.renderer_mut().set_node_color(node, &color);
                self.adapter.notify(
                    format!("Selected node {node} as source. Click another node to create edge."),
                    Severity::Info,
                );
                InteractionOutcome::SourceSelected(node)
            }
            Some(source) if source == node => {
                self.drop_edge_source();
                InteractionOutcome::Deselected
            }
            Some(source) => {
                let created = self.create_edge(source, node);
                lock(&self.store).reset_colors();
                self.adapter.sync_colors();
                self.edge_source = None;
                match created {
                    Ok(edge) => InteractionOutcome::EdgeCreated(edge),
                    Err(_) => InteractionOutcome::Ignored,
                }
            }
        }
    }

    fn drop_edge_source(&mut self) {
        lock(&self.store).reset_colors();
        self.adapter.sync_colors();
        self.edge_source = None;
        self.adapter.notify("Node deselected", Severity::Info);
    }

    fn describe_edge(&self, edge_id: EdgeId) -> Option<String> {
        let store = lock(&self.store);
        let edge = store.get_edge(edge_id)?;
        let name = |id: NodeId| {
            store
                .get_node(id)
                .map(|n| n.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let weight = match edge.weight {
            Some(w) if w != 0.0 => format!(" (weight: {w})"),
            _ => String::new(),
        };
        Some(format!("Edge: {} → {}{}", name(edge.from), name(edge.to), weight))
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

impl<R: Renderer> GraphEditor<R> {
    /// Starts an animated traversal using the configured speed.
    ///
    /// A missing start node or an already running traversal raises a
    /// blocking alert and returns a validation error.
    pub fn start_traversal(
        &mut self,
        start: Option<NodeId>,
        mode: TraversalMode,
    ) -> Result<TraversalRun> {
        let Some(start) = start else {
            self.adapter.alert("Select a start node");
            return Err(GraphError::validation("no start node selected"));
        };
        if self.engine.is_running() {
            self.adapter.alert("Algorithm is already running");
            return Err(GraphError::validation("traversal is already running"));
        }

        let request = TraversalRequest {
            start,
            mode,
            directed: self.directed,
            timing: self.timing(),
        };
        match self.engine.traverse(request) {
            Ok(run) => {
                self.adapter.begin_traversal(mode);
                Ok(run)
            }
            Err(e) => {
                self.adapter.alert(&e.to_string());
                Err(e)
            }
        }
    }

    /// Feeds every event of `run` to the presentation side until the stream
    /// closes, then returns the run's summary.
    pub async fn drive(&mut self, mut run: TraversalRun) -> Result<TraversalSummary> {
        while let Some(event) = run.next_event().await {
            self.adapter.apply_traversal_event(&event);
        }
        run.finish().await
    }

    /// Starts a traversal and drives it to the end.
    ///
    /// Stop it from elsewhere through a clone of [`GraphEditor::engine`].
    pub async fn run_traversal(
        &mut self,
        start: Option<NodeId>,
        mode: TraversalMode,
    ) -> Result<TraversalSummary> {
        let run = self.start_traversal(start, mode)?;
        self.drive(run).await
    }

    /// Cancels the running traversal and restores every node's color.
    pub fn stop_traversal(&mut self) -> bool {
        let signalled = self.engine.stop();
        self.adapter.sync_colors();
        if !signalled {
            self.adapter.notify("Algorithm stopped", Severity::Info);
        }
        signalled
    }
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

impl<R: Renderer> GraphEditor<R> {
    /// Serializes the current graph.
    pub fn export(&mut self, format: ExportFormat) -> Result<String> {
        let snapshot = self.snapshot();
        match serializer::export(&snapshot, format) {
            Ok(content) => {
                self.adapter.notify(
                    format!("Graph exported to {} successfully", format.label()),
                    Severity::Success,
                );
                Ok(content)
            }
            Err(e) => {
                self.adapter.notify(
                    format!("Error exporting to {}: {}", format.label(), e),
                    Severity::Error,
                );
                Err(e)
            }
        }
    }

    /// Writes an export as `graph.json` / `graph.xml` into `dir`.
    pub async fn export_to_dir(&mut self, dir: &Path, format: ExportFormat) -> Result<PathBuf> {
        let content = self.export(format)?;
        let path = dir.join(format.file_name());
        if let Err(e) = tokio::fs::write(&path, content).await {
            let error = GraphError::from(e);
            self.report(&error, Severity::Error);
            return Err(error);
        }
        info!(path = %path.display(), mime = format.mime_type(), "graph exported");
        Ok(path)
    }

    /// Replaces the graph with the contents of a document.
    pub fn import_text(&mut self, text: &str, format: ExportFormat) -> Result<GraphStats> {
        let imported = serializer::import(text, format)
            .and_then(|snapshot| lock(&self.store).restore(snapshot));
        match imported {
            Ok(()) => {
                self.edge_source = None;
                let stats = self.stats();
                self.adapter.notify(
                    format!(
                        "{} imported successfully: {} nodes, {} edges",
                        format.label(),
                        stats.node_count,
                        stats.edge_count
                    ),
                    Severity::Success,
                );
                self.publish(GraphEvent::Replaced {
                    node_count: stats.node_count,
                    edge_count: stats.edge_count,
                });
                Ok(stats)
            }
            Err(e) => {
                self.adapter.notify(
                    format!("Error importing {}: {}", format.label(), e),
                    Severity::Error,
                );
                Err(e)
            }
        }
    }

    /// Reads and imports a user-selected file.
    ///
    /// Rejects a missing selection, a file that does not exist, or one whose
    /// extension does not match `format`. The graph is only replaced once
    /// the whole document parsed.
    pub async fn import_file(
        &mut self,
        path: Option<&Path>,
        format: ExportFormat,
    ) -> Result<GraphStats> {
        let path = match self.check_selection(path, format).await {
            Ok(path) => path,
            Err(e) => {
                self.report(&e, Severity::Warning);
                return Err(e);
            }
        };
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                let error = GraphError::from(e);
                self.report(&error, Severity::Error);
                return Err(error);
            }
        };
        self.import_text(&text, format)
    }

    async fn check_selection(&self, path: Option<&Path>, format: ExportFormat) -> Result<PathBuf> {
        let selection_error = |message: &str, path: &Path| GraphError::FileSelection {
            message: message.to_string(),
            path: path.display().to_string(),
        };
        let Some(path) = path else {
            return Err(selection_error("Please select a file first", Path::new("")));
        };
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(selection_error("Please select a file first", path));
        }
        if ExportFormat::from_path(path) != Some(format) {
            let message = match format {
                ExportFormat::Json => "Please select a JSON file",
                ExportFormat::Xml => "Please select an XML file",
            };
            return Err(selection_error(message, path));
        }
        Ok(path.to_path_buf())
    }
}
