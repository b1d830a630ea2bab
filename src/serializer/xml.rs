use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{GraphError, Result};
use crate::types::*;

use super::{iso_timestamp, restore_counter, FORMAT_VERSION};

fn format_error(message: impl Into<String>) -> GraphError {
    GraphError::ImportFormat {
        message: message.into(),
    }
}

/// Serializes a snapshot as an XML document stamped with the current time.
pub fn export_xml(snapshot: &GraphSnapshot) -> String {
    export_xml_at(snapshot, Utc::now())
}

/// Serializes a snapshot as an XML document with a fixed export date.
///
/// Optional attributes (`x`, `y`, `label`, `weight`, `color`) are omitted
/// when unset; `directed="true"` appears only on directed edges.
pub fn export_xml_at(snapshot: &GraphSnapshot, exported_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graph>\n");

    out.push_str("  <metadata>\n");
    out.push_str(&format!(
        "    <nodeCounter>{}</nodeCounter>\n",
        snapshot.node_counter
    ));
    out.push_str(&format!(
        "    <edgeCounter>{}</edgeCounter>\n",
        snapshot.edge_counter
    ));
    out.push_str(&format!(
        "    <exportDate>{}</exportDate>\n",
        iso_timestamp(exported_at)
    ));
    out.push_str(&format!("    <version>{}</version>\n", FORMAT_VERSION));
    out.push_str("  </metadata>\n");

    out.push_str("  <nodes>\n");
    for node in &snapshot.nodes {
        out.push_str(&format!(
            "    <node id=\"{}\" label=\"{}\" color=\"{}\"",
            node.id,
            escape(node.label.as_str()),
            escape(node.color.as_str()),
        ));
        if let Some(position) = node.position {
            out.push_str(&format!(" x=\"{}\" y=\"{}\"", position.x, position.y));
        }
        out.push_str("/>\n");
    }
    out.push_str("  </nodes>\n");

    out.push_str("  <edges>\n");
    for edge in &snapshot.edges {
        out.push_str(&format!(
            "    <edge id=\"{}\" from=\"{}\" to=\"{}\"",
            edge.id, edge.from, edge.to
        ));
        if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
            out.push_str(&format!(" label=\"{}\"", escape(label)));
        }
        if let Some(weight) = edge.weight {
            out.push_str(&format!(" weight=\"{}\"", weight));
        }
        if let Some(color) = edge.color.as_deref() {
            out.push_str(&format!(" color=\"{}\"", escape(color)));
        }
        if edge.directed {
            out.push_str(" directed=\"true\"");
        }
        out.push_str("/>\n");
    }
    out.push_str("  </edges>\n");

    out.push_str("</graph>");
    out
}

/// Metadata elements whose text content is read.
#[derive(Debug, Clone, Copy)]
enum CounterField {
    Node,
    Edge,
}

impl CounterField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"nodeCounter" => Some(CounterField::Node),
            b"edgeCounter" => Some(CounterField::Edge),
            _ => None,
        }
    }
}

/// Parses an XML document into a snapshot.
///
/// `<node>` and `<edge>` elements are collected wherever they appear.
/// Malformed markup, an empty document, or unparseable numeric attributes
/// fail with [`GraphError::ImportFormat`]. Base colors are re-derived from
/// `color`.
pub fn import_xml(text: &str) -> Result<GraphSnapshot> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut nodes: Vec<Node> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut node_counter: Option<u64> = None;
    let mut edge_counter: Option<u64> = None;

    let mut depth: usize = 0;
    let mut saw_root = false;
    let mut open_counter: Option<CounterField> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            format_error(format!("{} at position {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(element) => {
                enter_element(&element, &mut depth, &mut saw_root)?;
                collect_element(&element, &mut nodes, &mut edges)?;
                open_counter = CounterField::from_tag(element.name().as_ref());
                depth += 1;
            }
            Event::Empty(element) => {
                enter_element(&element, &mut depth, &mut saw_root)?;
                collect_element(&element, &mut nodes, &mut edges)?;
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format_error("unexpected closing tag"))?;
                open_counter = None;
            }
            Event::Text(content) => {
                let value = content
                    .unescape()
                    .map_err(|e| format_error(e.to_string()))?;
                if depth == 0 {
                    return Err(format_error("text outside the root element"));
                }
                match open_counter {
                    Some(CounterField::Node) => {
                        node_counter = Some(parse_number(&value, "nodeCounter")?)
                    }
                    Some(CounterField::Edge) => {
                        edge_counter = Some(parse_number(&value, "edgeCounter")?)
                    }
                    None => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(format_error("document has no root element"));
    }
    if depth != 0 {
        return Err(format_error("unclosed element at end of document"));
    }

    Ok(GraphSnapshot {
        node_counter: restore_counter(node_counter, nodes.iter().map(|n| n.id)),
        edge_counter: restore_counter(edge_counter, edges.iter().map(|e| e.id)),
        nodes,
        edges,
    })
}

/// Tracks the single root element of the document.
fn enter_element(element: &BytesStart, depth: &mut usize, saw_root: &mut bool) -> Result<()> {
    if *depth == 0 {
        if *saw_root {
            return Err(format_error(format!(
                "unexpected second root element <{}>",
                String::from_utf8_lossy(element.name().as_ref())
            )));
        }
        *saw_root = true;
    }
    Ok(())
}

fn collect_element(
    element: &BytesStart,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
) -> Result<()> {
    match element.name().as_ref() {
        b"node" => nodes.push(parse_node(element)?),
        b"edge" => edges.push(parse_edge(element)?),
        _ => {}
    }
    Ok(())
}

/// Unescaped attribute values of an element keyed by attribute name.
fn attributes(element: &BytesStart) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| format_error(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format_error(e.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn parse_number(raw: &str, what: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format_error(format!("{what} is not an integer: '{raw}'")))
}

fn required_id(attrs: &HashMap<String, String>, name: &str, element: &str) -> Result<u64> {
    let raw = attrs
        .get(name)
        .ok_or_else(|| format_error(format!("<{element}> is missing '{name}'")))?;
    parse_number(raw, &format!("<{element}> {name}"))
}

/// Reads an optional float attribute; empty values count as absent.
fn optional_float(attrs: &HashMap<String, String>, name: &str) -> Result<Option<f64>> {
    attrs
        .get(name)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format_error(format!("{name} is not a number: '{v}'")))
        })
        .transpose()
}

fn non_empty(attrs: &mut HashMap<String, String>, name: &str) -> Option<String> {
    attrs.remove(name).filter(|v| !v.is_empty())
}

fn parse_node(element: &BytesStart) -> Result<Node> {
    let mut attrs = attributes(element)?;
    let id = required_id(&attrs, "id", "node")?;
    let x = optional_float(&attrs, "x")?;
    let y = optional_float(&attrs, "y")?;
    let color =
        non_empty(&mut attrs, "color").unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string());
    let label = attrs.remove("label").unwrap_or_else(|| format!("Node {id}"));

    let position = match (x, y) {
        (None, None) => None,
        (x, y) => Some(Position {
            x: x.unwrap_or_default(),
            y: y.unwrap_or_default(),
        }),
    };

    Ok(Node {
        id,
        label,
        base_color: color.clone(),
        color,
        position,
    })
}

fn parse_edge(element: &BytesStart) -> Result<Edge> {
    let mut attrs = attributes(element)?;
    Ok(Edge {
        id: required_id(&attrs, "id", "edge")?,
        from: required_id(&attrs, "from", "edge")?,
        to: required_id(&attrs, "to", "edge")?,
        weight: optional_float(&attrs, "weight")?,
        directed: attrs.get("directed").is_some_and(|v| v == "true"),
        label: non_empty(&mut attrs, "label"),
        color: non_empty(&mut attrs, "color"),
    })
}
