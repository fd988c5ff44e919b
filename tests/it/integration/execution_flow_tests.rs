//! Execution Overlay Integration Tests
//!
//! Execution events arrive on a feed from another thread and are folded into
//! the overlay between pointer events.

use crate::helpers::TestEngineBuilder;
use flowcanvas::engine::{EngineEvent, HostCallbacks, SharedEngine};
use flowcanvas::geometry::point;
use flowcanvas::input::{PointerEvent, PointerId};
use flowcanvas::geometry::Size;
use flowcanvas::overlay::{
    ExecutionEvent, ExecutionOverlay, NodeRunState, NodeRunStatus, ProgressMark,
    StaticExecutionSource,
};
use flowcanvas::render::{DisplayList, DrawCommand, Layer, Palette};
use flowcanvas::shapes::{Selection, ShapeBounds, StaticLayout};
use indexmap::IndexMap;
use std::thread;
use std::time::{Duration, Instant};

fn progress(node: u64, value: f32, max: f32) -> ExecutionEvent {
    ExecutionEvent::NodeProgress { node, value, max }
}

fn has_progress_bar(list: &DisplayList, palette: &Palette) -> bool {
    list.layer_commands(Layer::Nodes).iter().any(|c| {
        matches!(c, DrawCommand::FillRect { color, .. } if *color == palette.progress)
    })
}

#[test]
fn test_progress_for_unlaid_node_is_stored_not_drawn() {
    let builder = TestEngineBuilder::new().with_node(1, (100.0, 100.0, 150.0, 75.0));
    let mut layout = builder.layout().clone();
    let mut engine = builder.build();
    engine.subscribe_execution(&StaticExecutionSource::default());

    engine.handle(EngineEvent::Execution(progress(7, 42.0, 100.0)));
    assert_eq!(engine.overlay().progress, Some(ProgressMark { id: 7, percent: 42 }));

    let palette = Palette::from_theme(&engine.settings().theme);
    let mut list = DisplayList::new(Size::new(800.0, 600.0));
    engine.render(&mut list, Instant::now());
    assert!(!has_progress_bar(&list, &palette));

    // Once the node is laid out the bar appears
    layout.nodes.push(ShapeBounds::new(7, 300.0, 100.0, 150.0, 75.0));
    engine.reload_layout(&layout);
    let mut list = DisplayList::new(Size::new(800.0, 600.0));
    engine.render(&mut list, Instant::now());
    assert!(has_progress_bar(&list, &palette));
}

#[test]
fn test_feed_from_network_thread() {
    let mut engine = TestEngineBuilder::new()
        .with_node(1, (0.0, 0.0, 100.0, 50.0))
        .with_node(2, (200.0, 0.0, 100.0, 50.0))
        .build();
    engine.subscribe_execution(&StaticExecutionSource::default());
    let feed = engine.execution_feed();

    let producer = thread::spawn(move || {
        feed.send(ExecutionEvent::NodeStart { node: 1 });
        feed.send(progress(1, 1.0, 4.0));
        feed.send(ExecutionEvent::NodeComplete { node: 1 });
        feed.send(ExecutionEvent::NodeStart { node: 2 });
        feed.send_json(r#"{"type": "node_progress", "data": {"node": 2, "value": 3, "max": 4}}"#)
            .unwrap();
    });
    producer.join().unwrap();

    assert_eq!(engine.overlay(), &ExecutionOverlay::default());
    let applied = engine.process_pending();
    assert_eq!(applied, 5);

    let overlay = engine.overlay();
    assert_eq!(overlay.executing_id, Some(2));
    assert_eq!(overlay.progress_for(2), Some(75));
    assert_eq!(overlay.progress_for(1), None);
    assert!(engine.needs_redraw());
}

#[test]
fn test_terminal_event_clears_overlay() {
    for terminal in [
        ExecutionEvent::Success,
        ExecutionEvent::Interrupted,
        ExecutionEvent::Error {
            node: Some(2),
            message: Some("out of memory".into()),
        },
    ] {
        let mut engine = TestEngineBuilder::new().build();
        engine.subscribe_execution(&StaticExecutionSource::default());
        engine.handle(EngineEvent::Execution(ExecutionEvent::NodeStart { node: 2 }));
        engine.handle(EngineEvent::Execution(progress(2, 5.0, 10.0)));
        assert!(!engine.overlay().is_empty());

        engine.handle(EngineEvent::Execution(terminal));
        assert!(engine.overlay().is_empty());
    }
}

#[test]
fn test_aggregate_state_marks_running_and_errored() {
    let mut engine = TestEngineBuilder::new().build();
    engine.subscribe_execution(&StaticExecutionSource::default());

    let mut nodes = IndexMap::new();
    nodes.insert(
        4,
        NodeRunState {
            state: NodeRunStatus::Finished,
            value: 0.0,
            max: 0.0,
        },
    );
    nodes.insert(
        5,
        NodeRunState {
            state: NodeRunStatus::Running,
            value: 1.0,
            max: 2.0,
        },
    );
    nodes.insert(
        6,
        NodeRunState {
            state: NodeRunStatus::Error,
            value: 0.0,
            max: 0.0,
        },
    );
    engine.handle(EngineEvent::Execution(ExecutionEvent::AggregateState { nodes }));

    let overlay = engine.overlay();
    assert!(overlay.is_executing(5));
    assert!(overlay.is_errored(6));
    assert_eq!(overlay.progress_for(5), Some(50));
    assert_eq!(overlay.node_states.len(), 3);
}

#[test]
fn test_snapshot_supersedes_events_before_subscribe() {
    let mut engine = TestEngineBuilder::new().build();
    engine.handle(EngineEvent::Execution(progress(3, 9.0, 10.0)));
    assert!(engine.overlay().is_empty());
    assert_eq!(engine.overlay_sync().skipped_events(), 1);

    let snapshot = ExecutionOverlay {
        executing_id: Some(3),
        progress: Some(ProgressMark { id: 3, percent: 10 }),
        ..Default::default()
    };
    engine.subscribe_execution(&StaticExecutionSource(snapshot));

    assert_eq!(engine.overlay().executing_id, Some(3));
    assert_eq!(engine.overlay().progress_for(3), Some(10));
    assert_eq!(engine.overlay_sync().skipped_events(), 0);
}

#[test]
fn test_stale_terminal_event_keeps_running_snapshot() {
    let mut engine = TestEngineBuilder::new()
        .with_node(5, (100.0, 100.0, 150.0, 75.0))
        .build();
    engine.handle(EngineEvent::Execution(ExecutionEvent::NodeStart { node: 2 }));
    engine.handle(EngineEvent::Execution(ExecutionEvent::Success));

    let snapshot = ExecutionOverlay {
        executing_id: Some(5),
        progress: Some(ProgressMark { id: 5, percent: 40 }),
        ..Default::default()
    };
    engine.subscribe_execution(&StaticExecutionSource(snapshot));

    assert!(engine.overlay().is_executing(5));
    assert_eq!(engine.overlay().progress_for(5), Some(40));

    engine.handle(EngineEvent::Execution(progress(5, 1.0, 2.0)));
    assert_eq!(engine.overlay().progress_for(5), Some(50));
}

#[test]
fn test_resubscribe_reseeds_from_source() {
    let mut engine = TestEngineBuilder::new().build();
    engine.subscribe_execution(&StaticExecutionSource::default());
    engine.handle(EngineEvent::Execution(ExecutionEvent::NodeStart { node: 8 }));
    assert!(engine.overlay().is_executing(8));

    engine.subscribe_execution(&StaticExecutionSource::default());
    assert!(engine.overlay().is_empty());
}

#[test]
fn test_teardown_disconnects_feed() {
    let mut engine = TestEngineBuilder::new().build();
    engine.subscribe_execution(&StaticExecutionSource::default());
    let feed = engine.execution_feed();
    assert!(feed.send(ExecutionEvent::NodeStart { node: 1 }));

    engine.teardown();
    assert!(!feed.send(ExecutionEvent::NodeStart { node: 2 }));
    engine.process_pending();
    assert!(engine.overlay().is_empty());
}

#[test]
fn test_shared_engine_across_threads() {
    let layout = StaticLayout {
        nodes: vec![ShapeBounds::new(1, 0.0, 0.0, 100.0, 50.0)],
        ..Default::default()
    };
    let shared = SharedEngine::new(flowcanvas::Engine::new(Default::default(), &layout));
    shared.with(|engine| engine.subscribe_execution(&StaticExecutionSource::default()));

    let worker = {
        let shared = shared.clone();
        thread::spawn(move || {
            shared.push(EngineEvent::Execution(ExecutionEvent::NodeStart { node: 1 }));
        })
    };
    worker.join().unwrap();

    assert_eq!(shared.process_pending(), 1);
    assert!(shared.lock().overlay().is_executing(1));
}

/// Enters reposition mode whenever a shape is tapped.
struct RepositionOnTap(SharedEngine);

impl HostCallbacks for RepositionOnTap {
    fn on_tap_select(&mut self, selection: Option<Selection>) {
        if selection.is_some() {
            self.0.push(EngineEvent::EnterReposition);
        }
    }
}

#[test]
fn test_callback_pushes_back_into_shared_engine() {
    let layout = StaticLayout {
        nodes: vec![ShapeBounds::new(1, 0.0, 0.0, 100.0, 50.0)],
        ..Default::default()
    };
    let shared = SharedEngine::new(flowcanvas::Engine::new(Default::default(), &layout));
    shared.set_callbacks(RepositionOnTap(shared.clone()));

    let t0 = Instant::now();
    let at = point(50.0, 25.0);
    shared.push(EngineEvent::Pointer(PointerEvent::down(PointerId::Mouse, at, t0)));
    shared.push(EngineEvent::Pointer(PointerEvent::up(
        PointerId::Mouse,
        at,
        t0 + Duration::from_millis(50),
    )));
    assert_eq!(shared.process_pending(), 2);

    // Queued by the callback, applied on the next pass
    assert_eq!(shared.lock().queued(), 1);
    assert!(!shared.lock().reposition().is_active());
    assert_eq!(shared.process_pending(), 1);
    assert!(shared.lock().reposition().is_active());
}

#[test]
fn test_calls_made_inside_with_are_delivered_after_unlock() {
    let layout = StaticLayout {
        nodes: vec![ShapeBounds::new(1, 0.0, 0.0, 100.0, 50.0)],
        ..Default::default()
    };
    let shared = SharedEngine::new(flowcanvas::Engine::new(Default::default(), &layout));
    shared.set_callbacks(RepositionOnTap(shared.clone()));

    let t0 = Instant::now();
    shared.with(|engine| crate::helpers::tap(engine, (50.0, 25.0), t0));
    assert_eq!(shared.lock().queued(), 1);
    assert_eq!(shared.process_pending(), 1);
    assert!(shared.lock().reposition().is_active());
}
