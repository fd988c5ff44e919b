//! Unit tests for settings persistence.

use flowcanvas::constants::{DRAG_THRESHOLD, GRID_SIZE, MAX_SCALE, MIN_SCALE};
use flowcanvas::error::EngineError;
use flowcanvas::settings::EngineSettings;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_defaults_match_constants() {
    let settings = EngineSettings::default();
    assert_eq!(settings.gesture.drag_threshold, DRAG_THRESHOLD);
    assert_eq!(settings.grid.size, GRID_SIZE);
    assert_eq!(settings.viewport.scale_bounds(), (MIN_SCALE, MAX_SCALE));
    assert!(settings.grid.snap_by_default);
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = EngineSettings::default();
    settings.gesture.long_press_duration_ms = 750;
    settings.grid.size = 25.0;
    settings.theme.link = "#ff00ff".into();
    settings.save(&path).unwrap();

    let loaded = EngineSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = EngineSettings::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn test_load_invalid_json_is_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let err = EngineSettings::load(&path).unwrap_err();
    assert!(matches!(err, EngineError::Json(_)));
    assert!(err.to_string().starts_with("JSON parse error"));
}

#[test]
fn test_load_or_default_falls_back() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert_eq!(EngineSettings::load_or_default(&missing), EngineSettings::default());

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "[1, 2, 3]").unwrap();
    assert_eq!(EngineSettings::load_or_default(&broken), EngineSettings::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"viewport": {"max_scale": 3.0}}"#).unwrap();

    let settings = EngineSettings::load_or_default(&path);
    assert_eq!(settings.viewport.max_scale, 3.0);
    assert_eq!(settings.viewport.min_scale, MIN_SCALE);
    assert_eq!(settings.gesture, EngineSettings::default().gesture);
}
