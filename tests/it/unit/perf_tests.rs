//! Unit tests for perf module.

use flowcanvas::perf::{FrameMonitor, ScopedTimer};
use flowcanvas::render::RenderStats;
use std::time::Duration;

#[test]
fn test_frame_monitor_empty() {
    let monitor = FrameMonitor::new();
    assert_eq!(monitor.total_frames(), 0);
    assert_eq!(monitor.average_frame_time(), 0.0);
    assert_eq!(monitor.slow_frame_percentage(), 0.0);
}

#[test]
fn test_average_and_max() {
    let mut monitor = FrameMonitor::new();
    monitor.record(Duration::from_millis(2), RenderStats::default());
    monitor.record(Duration::from_millis(4), RenderStats::default());
    monitor.record(Duration::from_millis(6), RenderStats::default());

    assert_eq!(monitor.total_frames(), 3);
    assert!((monitor.average_frame_time() - 4.0).abs() < 1e-9);
    assert!((monitor.max_frame_time() - 6.0).abs() < 1e-9);
}

#[test]
fn test_slow_frames_counted() {
    let mut monitor = FrameMonitor::new();
    monitor.record(Duration::from_millis(1), RenderStats::default());
    monitor.record(Duration::from_millis(200), RenderStats::default());

    assert!((monitor.slow_frame_percentage() - 50.0).abs() < 1e-9);

    monitor.reset();
    assert_eq!(monitor.total_frames(), 0);
    assert_eq!(monitor.slow_frame_percentage(), 0.0);
}

#[test]
fn test_measure_returns_pass_stats() {
    let mut monitor = FrameMonitor::new();
    let stats = monitor.measure(|| RenderStats {
        nodes: 42,
        ..Default::default()
    });
    assert_eq!(stats.nodes, 42);
    assert_eq!(monitor.last().unwrap().stats.nodes, 42);
    assert_eq!(monitor.total_frames(), 1);
    assert!(monitor.average_frame_time() >= 0.0);
}

#[test]
fn test_scoped_timer_creation() {
    // High threshold, so dropping it logs nothing
    let timer = ScopedTimer::new("test_op", 1000.0);
    assert!(timer.elapsed_ms() >= 0.0);
}

#[test]
fn test_profile_scope_macro_compiles() {
    fn hot_path() -> u32 {
        flowcanvas::profile_scope!("hot_path");
        7
    }
    assert_eq!(hot_path(), 7);
}
