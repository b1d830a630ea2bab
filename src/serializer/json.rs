use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{GraphError, Result};
use crate::types::*;

use super::{iso_timestamp, restore_counter, FORMAT_VERSION};

/// Node as written to and read from JSON documents.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: NodeId,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default, alias = "originalColor")]
    base_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
}

/// Legacy `arrows: {to: {enabled}}` direction marker.
#[derive(Debug, Default, Deserialize)]
struct Arrows {
    #[serde(default)]
    to: Option<ArrowEnd>,
}

#[derive(Debug, Default, Deserialize)]
struct ArrowEnd {
    #[serde(default)]
    enabled: bool,
}

/// Edge as written to and read from JSON documents.
#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    #[serde(default)]
    directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing)]
    arrows: Option<Arrows>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    node_counter: Option<u64>,
    #[serde(default)]
    edge_counter: Option<u64>,
    #[serde(default)]
    export_date: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            label: Some(node.label.clone()),
            color: Some(node.color.clone()),
            base_color: Some(node.base_color.clone()),
            x: node.position.map(|p| p.x),
            y: node.position.map(|p| p.y),
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let color = record
            .color
            .or(record.base_color)
            .unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string());
        let position = match (record.x, record.y) {
            (None, None) => None,
            (x, y) => Some(Position {
                x: x.unwrap_or_default(),
                y: y.unwrap_or_default(),
            }),
        };
        Node {
            id: record.id,
            label: record.label.unwrap_or_else(|| format!("Node {}", record.id)),
            base_color: color.clone(),
            color,
            position,
        }
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id,
            from: edge.from,
            to: edge.to,
            directed: edge.directed,
            label: edge.label.clone(),
            weight: edge.weight,
            color: edge.color.clone(),
            arrows: None,
        }
    }
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        let arrow = record
            .arrows
            .and_then(|a| a.to)
            .is_some_and(|end| end.enabled);
        Edge {
            id: record.id,
            from: record.from,
            to: record.to,
            directed: record.directed || arrow,
            label: record.label,
            weight: record.weight,
            color: record.color,
        }
    }
}

/// Serializes a snapshot as pretty-printed JSON stamped with the current time.
pub fn export_json(snapshot: &GraphSnapshot) -> Result<String> {
    export_json_at(snapshot, Utc::now())
}

/// Serializes a snapshot as pretty-printed JSON with a fixed export date.
pub fn export_json_at(snapshot: &GraphSnapshot, exported_at: DateTime<Utc>) -> Result<String> {
    let document = Document {
        nodes: snapshot.nodes.iter().map(NodeRecord::from).collect(),
        edges: snapshot.edges.iter().map(EdgeRecord::from).collect(),
        metadata: Some(Metadata {
            node_counter: Some(snapshot.node_counter),
            edge_counter: Some(snapshot.edge_counter),
            export_date: Some(iso_timestamp(exported_at)),
            version: Some(FORMAT_VERSION.to_string()),
        }),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a JSON document into a snapshot.
///
/// Fails with [`GraphError::ImportStructure`] when `nodes` or `edges` is
/// missing or malformed. Displayed and base color are both taken from
/// `color`, falling back to `baseColor`/`originalColor` and then the default.
pub fn import_json(text: &str) -> Result<GraphSnapshot> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let value: Value = serde_json::from_str(text)?;

    let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    if !has("nodes") || !has("edges") {
        return Err(GraphError::ImportStructure {
            message: "missing nodes or edges".to_string(),
        });
    }

    let document: Document =
        serde_json::from_value(value).map_err(|e| GraphError::ImportStructure {
            message: e.to_string(),
        })?;

    let nodes: Vec<Node> = document.nodes.into_iter().map(Node::from).collect();
    let edges: Vec<Edge> = document.edges.into_iter().map(Edge::from).collect();
    let (node_counter, edge_counter) = document
        .metadata
        .map(|m| (m.node_counter, m.edge_counter))
        .unwrap_or_default();

    Ok(GraphSnapshot {
        node_counter: restore_counter(node_counter, nodes.iter().map(|n| n.id)),
        edge_counter: restore_counter(edge_counter, edges.iter().map(|e| e.id)),
        nodes,
        edges,
    })
}
