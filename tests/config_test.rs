use std::time::Duration;

use graphwalk::config::*;
use graphwalk::types::{Highlight, TraversalMode, DEFAULT_NODE_COLOR};
use tempfile::TempDir;

#[test]
fn test_default_config_values() {
    let config = EditorConfig::default();
    assert_eq!(config.speed, DEFAULT_SPEED);
    assert_eq!(config.log_capacity, 30);
    assert_eq!(config.reset_delay_ms, 2000);
    assert_eq!(config.default_node_color, DEFAULT_NODE_COLOR);
    assert!(!config.directed);
}

#[test]
fn test_save_and_load_config() {
    let dir = TempDir::new().unwrap();
    let config = EditorConfig {
        speed: 5,
        directed: true,
        ..EditorConfig::default()
    };
    save_config(dir.path(), &config).unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_config(dir.path()).unwrap(), EditorConfig::default());
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(get_config_dir(dir.path())).unwrap();
    std::fs::write(get_config_path(dir.path()), r#"{"speed": 1}"#).unwrap();

    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(loaded.speed, 1);
    assert_eq!(loaded.log_capacity, 30);
}

#[test]
fn test_out_of_range_speed_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(get_config_dir(dir.path())).unwrap();
    std::fs::write(get_config_path(dir.path()), r#"{"speed": 9}"#).unwrap();
    assert!(load_config(dir.path()).is_err());
}

#[test]
fn test_graphwalk_dir_location() {
    let dir = TempDir::new().unwrap();
    assert!(get_config_dir(dir.path()).ends_with(".graphwalk"));
    assert!(get_config_path(dir.path()).ends_with(".graphwalk/config.json"));
}

#[test]
fn test_speed_presets() {
    let reset = Duration::from_millis(2000);
    let normal = TraversalTiming::for_speed(3, reset);
    assert_eq!(normal.visit_delay, Duration::from_millis(500));
    assert_eq!(normal.settle_delay, Duration::from_millis(500));

    let very_slow = TraversalTiming::for_speed(1, reset);
    assert_eq!(very_slow.visit_delay, Duration::from_millis(1500));
    assert_eq!(very_slow.settle_delay, Duration::from_millis(1000));

    let very_fast = TraversalTiming::for_speed(5, reset);
    assert_eq!(very_fast.visit_delay, Duration::from_millis(100));
    assert_eq!(very_fast.settle_delay, Duration::from_millis(150));
    assert_eq!(very_fast.reset_delay, reset);

    let unknown = TraversalTiming::for_speed(0, reset);
    assert_eq!(unknown.visit_delay, Duration::from_millis(1000));
    assert_eq!(unknown.settle_delay, Duration::from_millis(500));

    assert_eq!(speed_name(3), "Normal");
}

#[test]
fn test_palette_frontier_depends_on_mode() {
    let palette = HighlightPalette::default();
    assert_eq!(
        palette.color_for(Highlight::Frontier, TraversalMode::Bfs),
        palette.bfs_frontier
    );
    assert_eq!(
        palette.color_for(Highlight::Frontier, TraversalMode::Dfs),
        palette.dfs_frontier
    );
    assert_eq!(
        palette.color_for(Highlight::Done, TraversalMode::Dfs),
        palette.done
    );
}

#[test]
fn test_config_serde_roundtrip() {
    let config = EditorConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let deserialized: EditorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}

#[test]
fn test_config_errors_name_the_settings_file() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(get_config_dir(dir.path())).unwrap();
    std::fs::write(get_config_path(dir.path()), "{ not json").unwrap();

    let message = load_config(dir.path()).unwrap_err().to_string();
    assert!(message.starts_with("config error: graphwalk settings"));
    assert!(message.contains(".graphwalk"));
    assert!(message.contains("not valid JSON"));
}

#[test]
fn test_save_config_reports_blocked_directory() {
    let dir = TempDir::new().unwrap();
    // A plain file where the .graphwalk directory should go.
    std::fs::write(get_config_dir(dir.path()), "").unwrap();

    let message = save_config(dir.path(), &EditorConfig::default())
        .unwrap_err()
        .to_string();
    assert!(message.contains("cannot create .graphwalk directory"));
}
