use chrono::{TimeZone, Utc};

use graphwalk::errors::GraphError;
use graphwalk::graph::GraphStore;
use graphwalk::serializer::*;
use graphwalk::types::*;

/// Helper: two labelled nodes joined by a weighted directed edge.
fn sample_snapshot() -> GraphSnapshot {
    let mut store = GraphStore::new();
    store.add_node(NodeSpec {
        label: Some("A".to_string()),
        position: Some(Position { x: 10.0, y: -5.5 }),
        ..NodeSpec::default()
    });
    store.add_node(NodeSpec {
        label: Some("B".to_string()),
        color: Some("#e74c3c".to_string()),
        ..NodeSpec::default()
    });
    store.add_edge(
        1,
        2,
        EdgeSpec {
            directed: true,
            label: Some("4".to_string()),
            weight: Some(4.0),
            color: None,
        },
    );
    store.snapshot()
}

#[test]
fn test_json_roundtrip_preserves_graph() {
    let snapshot = sample_snapshot();
    let text = export_json(&snapshot).unwrap();
    let imported = import_json(&text).unwrap();
    assert_eq!(imported, snapshot);
}

#[test]
fn test_xml_roundtrip_preserves_graph() {
    let snapshot = sample_snapshot();
    let text = export_xml(&snapshot);
    let imported = import_xml(&text).unwrap();
    assert_eq!(imported, snapshot);
}

#[test]
fn test_json_export_metadata() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let text = export_json_at(&sample_snapshot(), at).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["metadata"]["nodeCounter"], 2);
    assert_eq!(value["metadata"]["edgeCounter"], 1);
    assert_eq!(value["metadata"]["version"], "1.0");
    assert_eq!(value["metadata"]["exportDate"], "2024-03-01T12:30:00.000Z");
    assert_eq!(value["nodes"][0]["baseColor"], DEFAULT_NODE_COLOR);
    assert_eq!(value["edges"][0]["directed"], true);
}

#[test]
fn test_empty_graph_exports_and_imports() {
    let empty = GraphSnapshot::default();
    let json = export_json(&empty).unwrap();
    assert_eq!(import_json(&json).unwrap(), empty);

    let xml = export_xml(&empty);
    assert!(xml.contains("<nodes>"));
    assert_eq!(import_xml(&xml).unwrap(), empty);
}

#[test]
fn test_json_missing_edges_is_structure_error() {
    let err = import_json(r#"{"nodes": []}"#).unwrap_err();
    assert!(matches!(err, GraphError::ImportStructure { .. }));

    let err = import_json(r#"{"nodes": [], "edges": null}"#).unwrap_err();
    assert!(matches!(err, GraphError::ImportStructure { .. }));
}

#[test]
fn test_json_wrong_shape_is_structure_error() {
    let err = import_json(r#"{"nodes": [{"label": "no id"}], "edges": []}"#).unwrap_err();
    assert!(matches!(err, GraphError::ImportStructure { .. }));
}

#[test]
fn test_json_defaults_and_legacy_fields() {
    let text = r##"{
        "nodes": [
            {"id": 1},
            {"id": 2, "label": "Two", "originalColor": "#abcdef"}
        ],
        "edges": [
            {"id": 7, "from": 1, "to": 2, "arrows": {"to": {"enabled": true}}}
        ]
    }"##;
    let snapshot = import_json(text).unwrap();

    assert_eq!(snapshot.nodes[0].label, "Node 1");
    assert_eq!(snapshot.nodes[0].color, DEFAULT_NODE_COLOR);
    assert_eq!(snapshot.nodes[1].color, "#abcdef");
    assert_eq!(snapshot.nodes[1].base_color, "#abcdef");
    assert!(snapshot.edges[0].directed);
    // Without metadata the counters follow the highest ids.
    assert_eq!(snapshot.node_counter, 2);
    assert_eq!(snapshot.edge_counter, 7);
}

#[test]
fn test_highlighted_color_becomes_base_on_import() {
    let text = r##"{
        "nodes": [{"id": 1, "color": "#f39c12", "baseColor": "#3498db"}],
        "edges": []
    }"##;
    let node = &import_json(text).unwrap().nodes[0];
    assert_eq!(node.color, "#f39c12");
    assert_eq!(node.base_color, "#f39c12");
}

#[test]
fn test_counter_never_below_highest_id() {
    let text = r#"{
        "nodes": [{"id": 5}],
        "edges": [],
        "metadata": {"nodeCounter": 2, "edgeCounter": 9}
    }"#;
    let snapshot = import_json(text).unwrap();
    assert_eq!(snapshot.node_counter, 5);
    assert_eq!(snapshot.edge_counter, 9);
}

#[test]
fn test_xml_escapes_special_characters() {
    let mut store = GraphStore::new();
    store.add_node(NodeSpec {
        label: Some(r#"<A & "B">"#.to_string()),
        ..NodeSpec::default()
    });
    let snapshot = store.snapshot();

    let xml = export_xml(&snapshot);
    assert!(xml.contains("&lt;A &amp; &quot;B&quot;&gt;"));
    assert_eq!(import_xml(&xml).unwrap().nodes[0].label, r#"<A & "B">"#);
}

#[test]
fn test_xml_export_omits_unset_attributes() {
    let xml = export_xml(&sample_snapshot());
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(r##"<node id="1" label="A" color="#3498db" x="10" y="-5.5"/>"##));
    assert!(xml.contains(r##"<node id="2" label="B" color="#e74c3c"/>"##));
    assert!(xml.contains(r#"<edge id="1" from="1" to="2" label="4" weight="4" directed="true"/>"#));
    assert!(xml.ends_with("</graph>"));
}

#[test]
fn test_xml_missing_attributes_use_defaults() {
    let xml = r#"<graph>
        <nodes><node id="3"/></nodes>
        <edges><edge id="1" from="3" to="3" directed="false"/></edges>
    </graph>"#;
    let snapshot = import_xml(xml).unwrap();
    assert_eq!(snapshot.nodes[0].label, "Node 3");
    assert_eq!(snapshot.nodes[0].color, DEFAULT_NODE_COLOR);
    assert!(snapshot.nodes[0].position.is_none());
    assert!(!snapshot.edges[0].directed);
    assert_eq!(snapshot.node_counter, 3);
}

#[test]
fn test_malformed_xml_is_format_error() {
    for text in ["", "<graph><nodes></graph>", "<graph/><graph/>", "not xml"] {
        let err = import_xml(text).unwrap_err();
        assert!(
            matches!(err, GraphError::ImportFormat { .. }),
            "expected format error for {text:?}, got {err:?}"
        );
    }
}

#[test]
fn test_xml_bad_number_is_format_error() {
    let err = import_xml(r#"<graph><nodes><node id="one"/></nodes></graph>"#).unwrap_err();
    assert!(matches!(err, GraphError::ImportFormat { .. }));
}

#[test]
fn test_format_detection() {
    use std::path::Path;
    assert_eq!(
        ExportFormat::from_path(Path::new("graph.JSON")),
        Some(ExportFormat::Json)
    );
    assert_eq!(
        ExportFormat::from_path(Path::new("dir/graph.xml")),
        Some(ExportFormat::Xml)
    );
    assert_eq!(ExportFormat::from_path(Path::new("graph.txt")), None);
    assert_eq!(ExportFormat::Xml.file_name(), "graph.xml");
    assert_eq!(ExportFormat::Json.mime_type(), "application/json");
}

#[test]
fn test_import_accepts_leading_byte_order_mark() {
    let xml = "\u{FEFF}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <graph><nodes><node id=\"1\" label=\"A\"/><node id=\"2\"/></nodes>\
        <edges><edge id=\"1\" from=\"1\" to=\"2\"/></edges></graph>";
    let snapshot = import_xml(xml).unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.nodes[0].label, "A");
    assert_eq!(snapshot.edges.len(), 1);

    let json = "\u{FEFF}{\"nodes\": [{\"id\": 1}], \"edges\": []}";
    assert_eq!(import_json(json).unwrap().nodes.len(), 1);
}
