use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};
use crate::types::{Highlight, TraversalMode, DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR};

/// Name of the configuration file stored inside the `.graphwalk` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory holding editor settings.
pub const GRAPHWALK_DIR: &str = ".graphwalk";

/// Speed preset used when none is configured ("Normal").
pub const DEFAULT_SPEED: u8 = 3;

/// Colors painted onto nodes while a traversal runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightPalette {
    pub in_progress: String,
    pub done: String,
    pub bfs_frontier: String,
    pub dfs_frontier: String,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            in_progress: "#f39c12".to_string(),
            done: "#2ecc71".to_string(),
            bfs_frontier: "#3498db".to_string(),
            dfs_frontier: "#9b59b6".to_string(),
        }
    }
}

impl HighlightPalette {
    /// Resolves a semantic highlight to a concrete color for `mode`.
    pub fn color_for(&self, highlight: Highlight, mode: TraversalMode) -> &str {
        match (highlight, mode) {
            (Highlight::InProgress, _) => &self.in_progress,
            (Highlight::Done, _) => &self.done,
            (Highlight::Frontier, TraversalMode::Bfs) => &self.bfs_frontier,
            (Highlight::Frontier, TraversalMode::Dfs) => &self.dfs_frontier,
        }
    }
}

/// Delays that pace a traversal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalTiming {
    /// Pause while a node is shown as in progress.
    pub visit_delay: Duration,
    /// Pause after a node's neighbors were expanded.
    pub settle_delay: Duration,
    /// Wait after a completed run before colors go back to base.
    pub reset_delay: Duration,
}

impl TraversalTiming {
    /// Timing for a speed preset from 1 (very slow) to 5 (very fast).
    ///
    /// Unknown presets fall back to 1000 ms / 500 ms.
    pub fn for_speed(speed: u8, reset_delay: Duration) -> Self {
        let (visit_ms, settle_ms) = match speed {
            1 => (1500, 1000),
            2 => (1000, 750),
            3 => (500, 500),
            4 => (300, 300),
            5 => (100, 150),
            _ => (1000, 500),
        };
        Self {
            visit_delay: Duration::from_millis(visit_ms),
            settle_delay: Duration::from_millis(settle_ms),
            reset_delay,
        }
    }

    /// No pauses at all; useful for headless runs.
    pub fn immediate() -> Self {
        Self {
            visit_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            reset_delay: Duration::ZERO,
        }
    }
}

/// Human-readable name of a speed preset.
pub fn speed_name(speed: u8) -> &'static str {
    match speed {
        1 => "Very Slow",
        2 => "Slow",
        3 => "Normal",
        4 => "Fast",
        5 => "Very Fast",
        _ => "Custom",
    }
}

/// Settings for a graph editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Color for new nodes and imported nodes without one.
    pub default_node_color: String,
    /// Color shown for edges without their own color.
    pub default_edge_color: String,
    /// Whether the session starts in directed mode.
    pub directed: bool,
    /// Traversal speed preset, 1 through 5.
    pub speed: u8,
    /// Number of activity log entries kept.
    pub log_capacity: usize,
    /// Milliseconds between a finished traversal and the color reset.
    pub reset_delay_ms: u64,
    pub palette: HighlightPalette,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_node_color: DEFAULT_NODE_COLOR.to_string(),
            default_edge_color: DEFAULT_EDGE_COLOR.to_string(),
            directed: false,
            speed: DEFAULT_SPEED,
            log_capacity: 30,
            reset_delay_ms: 2000,
            palette: HighlightPalette::default(),
        }
    }
}

impl EditorConfig {
    /// Traversal timing derived from the speed preset and reset delay.
    pub fn timing(&self) -> TraversalTiming {
        TraversalTiming::for_speed(self.speed, Duration::from_millis(self.reset_delay_ms))
    }
}

/// Returns the path to the `.graphwalk` directory within the given root.
pub fn get_config_dir(root: &Path) -> PathBuf {
    root.join(GRAPHWALK_DIR)
}

/// Returns the path to `config.json` within the `.graphwalk` directory.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_config_dir(root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns the default configuration.
pub fn load_config(root: &Path) -> Result<EditorConfig> {
    let config_path = get_config_path(root);

    if !config_path.exists() {
        return Ok(EditorConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| GraphError::Config {
        message: format!(
            "cannot read graphwalk settings '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: EditorConfig = serde_json::from_str(&contents).map_err(|e| GraphError::Config {
        message: format!(
            "graphwalk settings '{}' are not valid JSON: {}",
            config_path.display(),
            e
        ),
    })?;

    if !(1..=5).contains(&config.speed) {
        return Err(GraphError::Config {
            message: format!("speed preset must be between 1 and 5, got {}", config.speed),
        });
    }

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it into place.
pub fn save_config(root: &Path, config: &EditorConfig) -> Result<()> {
    let config_dir = get_config_dir(root);
    fs::create_dir_all(&config_dir).map_err(|e| GraphError::Config {
        message: format!(
            "cannot create .graphwalk directory '{}': {}",
            config_dir.display(),
            e
        ),
    })?;

    let config_path = get_config_path(root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| GraphError::Config {
        message: format!("cannot encode graphwalk settings: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| GraphError::Config {
        message: format!(
            "cannot write pending settings '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path).map_err(|e| GraphError::Config {
        message: format!(
            "cannot move pending settings '{}' into '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}
