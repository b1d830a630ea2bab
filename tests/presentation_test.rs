use graphwalk::config::HighlightPalette;
use graphwalk::events::{GraphEvent, TraversalEvent};
use graphwalk::graph::store::{lock, shared};
use graphwalk::graph::GraphStore;
use graphwalk::presentation::*;
use graphwalk::types::*;

#[test]
fn test_log_evicts_oldest_entries() {
    let mut log = ActivityLog::new(3);
    for i in 1..=5 {
        log.push(format!("message {i}"), Severity::Info);
    }
    let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["message 3", "message 4", "message 5"]);
    assert_eq!(log.capacity(), 3);
}

#[test]
fn test_log_ignores_blank_algorithm_messages() {
    let mut log = ActivityLog::new(10);
    log.push("   ", Severity::Algorithm);
    assert!(log.is_empty());
    log.push("", Severity::Info);
    assert_eq!(log.len(), 1);
}

#[test]
fn test_log_entry_display_has_timestamp_prefix() {
    let mut log = ActivityLog::new(1);
    log.push("Graph cleared", Severity::Success);
    let entry = log.last().unwrap();
    let shown = entry.display();
    assert!(shown.starts_with('['));
    assert!(shown.ends_with("] Graph cleared"));
    assert_eq!(entry.severity.as_str(), "success");
}

#[test]
fn test_zero_capacity_keeps_one_entry() {
    let mut log = ActivityLog::new(0);
    log.push("a", Severity::Info);
    log.push("b", Severity::Info);
    assert_eq!(log.len(), 1);
    assert_eq!(log.last().unwrap().message, "b");
}

#[test]
fn test_adapter_paints_with_mode_palette() {
    let mut store = GraphStore::new();
    store.add_node(NodeSpec::default());
    let store = shared(store);
    let palette = HighlightPalette::default();
    let mut adapter =
        PresentationAdapter::new(HeadlessRenderer::new(), store, palette.clone(), 30);

    adapter.begin_traversal(TraversalMode::Dfs);
    adapter.apply_traversal_event(&TraversalEvent::Progress {
        visited_count: 2,
        frontier_size: 1,
    });
    adapter.apply_traversal_event(&TraversalEvent::Finished {
        visited_count: 2,
        cancelled: false,
    });

    let log = adapter.log();
    assert!(log.contains("Started DFS..."));
    assert!(log.contains("DFS: Visited 2 nodes, Stack: 1"));
    assert!(log.contains("DFS finished. Visited 2 nodes."));
}

#[test]
fn test_adapter_reports_cancellation() {
    let store = shared(GraphStore::new());
    let mut adapter =
        PresentationAdapter::new(HeadlessRenderer::new(), store, HighlightPalette::default(), 30);
    adapter.apply_traversal_event(&TraversalEvent::Finished {
        visited_count: 1,
        cancelled: true,
    });
    assert_eq!(adapter.log().last().unwrap().message, "Algorithm stopped");
}

#[test]
fn test_replaced_event_drops_selection() {
    let mut store = GraphStore::new();
    store.add_node(NodeSpec::default());
    let store = shared(store);
    let mut adapter =
        PresentationAdapter::new(HeadlessRenderer::new(), store.clone(), HighlightPalette::default(), 30);
    adapter.renderer_mut().select(vec![1]);

    lock(&store).clear();
    adapter.apply_graph_event(&GraphEvent::Replaced {
        node_count: 0,
        edge_count: 0,
    });
    assert!(adapter.renderer().selected_nodes().is_empty());
}

#[test]
fn test_alert_is_logged_as_warning() {
    let store = shared(GraphStore::new());
    let mut adapter =
        PresentationAdapter::new(HeadlessRenderer::new(), store, HighlightPalette::default(), 30);
    adapter.alert("Select a start node");
    let entry = adapter.log().last().unwrap();
    assert_eq!(entry.severity, Severity::Warning);
    assert_eq!(entry.message, "Select a start node");
}

#[test]
fn test_graph_events_serialize_with_tag() {
    let event = GraphEvent::EdgeRemoved { edge_id: 4 };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "edgeRemoved");
    assert_eq!(json["edgeId"], 4);
}

#[test]
fn test_replaced_event_paints_edges() {
    let mut store = GraphStore::new();
    store.add_node(NodeSpec::default());
    store.add_node(NodeSpec::default());
    store.add_edge(1, 2, EdgeSpec::default());
    let store = shared(store);
    let mut adapter =
        PresentationAdapter::new(HeadlessRenderer::new(), store, HighlightPalette::default(), 30)
            .with_edge_color("#00ff00");

    adapter.apply_graph_event(&GraphEvent::Replaced {
        node_count: 2,
        edge_count: 1,
    });
    assert_eq!(adapter.renderer().edge_color(1), Some("#00ff00"));
}

#[test]
fn test_log_entry_serializes_with_timestamp() {
    let mut log = ActivityLog::new(5);
    log.push("Imported graph", Severity::Success);
    let json = serde_json::to_value(log.last().unwrap()).unwrap();
    assert_eq!(json["message"], "Imported graph");
    assert!(json["timestamp"].as_str().is_some_and(|t| t.contains('T')));
}
