//! Unit tests for settings_watcher module.

use flowcanvas::settings_watcher::{SettingsWatcher, default_settings_path};
use std::fs;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_watcher_creation() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    fs::write(&settings_path, "{}").unwrap();

    let watcher = SettingsWatcher::new(settings_path.clone()).unwrap();
    assert_eq!(watcher.path(), settings_path.as_path());
}

#[test]
fn test_watcher_before_file_exists() {
    let dir = tempdir().unwrap();
    let mut watcher = SettingsWatcher::new(dir.path().join("settings.json")).unwrap();
    assert_eq!(watcher.poll(), None);
}

#[test]
fn test_default_paths() {
    let settings = default_settings_path();
    assert!(settings.is_some() || cfg!(target_os = "unknown"));
    if let Some(path) = settings {
        assert!(path.ends_with("flowcanvas/settings.json"));
    }
}

/// File watcher event delivery depends on OS-level notifications, which are
/// not deterministic in CI. This only checks that polling after a write does
/// not misbehave.
#[test]
#[ignore]
fn test_file_modification_detection() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    fs::write(&settings_path, "{}").unwrap();

    let mut watcher = SettingsWatcher::new(settings_path.clone()).unwrap();

    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(&settings_path)
        .unwrap();
    writeln!(file, "{{\"grid\": {{\"size\": 40.0}}}}").unwrap();
    file.sync_all().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(200));
    let _event = watcher.poll();
}
