//! Bidirectional JSON/XML codecs for graph snapshots.
//!
//! Both formats carry the node and edge records plus the two id counters.
//! Imports never touch a store; the caller decides whether to apply the
//! returned snapshot.

/// JSON document codec.
pub mod json;

/// XML document codec.
pub mod xml;

use std::path::Path;

pub use json::{export_json, export_json_at, import_json};
pub use xml::{export_xml, export_xml_at, import_xml};

use crate::errors::Result;
use crate::types::GraphSnapshot;

/// Document format version written into export metadata.
pub const FORMAT_VERSION: &str = "1.0";

/// File formats understood by import and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Xml,
}

#[allow(clippy::should_implement_trait)]
impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }

    /// Parses a format name, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<ExportFormat> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "xml" => Some(ExportFormat::Xml),
            _ => None,
        }
    }

    /// Infers the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(ExportFormat::from_str)
    }

    /// Fixed file name used for exports.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "graph.json",
            ExportFormat::Xml => "graph.xml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Xml => "application/xml",
        }
    }

    /// Upper-case name used in activity messages.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Xml => "XML",
        }
    }
}

/// Serializes `snapshot` in the given format.
pub fn export(snapshot: &GraphSnapshot, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_json(snapshot),
        ExportFormat::Xml => Ok(export_xml(snapshot)),
    }
}

/// Parses a document in the given format.
pub fn import(text: &str, format: ExportFormat) -> Result<GraphSnapshot> {
    match format {
        ExportFormat::Json => import_json(text),
        ExportFormat::Xml => import_xml(text),
    }
}

/// Picks the counter to restore after an import.
///
/// A recorded counter is honored but never allowed below the highest id
/// present, so later ids cannot collide; without one, the highest id wins
/// (0 for an empty set).
pub(crate) fn restore_counter(recorded: Option<u64>, ids: impl Iterator<Item = u64>) -> u64 {
    let max_id = ids.max().unwrap_or(0);
    recorded.map_or(max_id, |counter| counter.max(max_id))
}

/// Export timestamp in the `YYYY-MM-DDTHH:MM:SS.mmmZ` form.
pub(crate) fn iso_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
