//! Render Pass Integration Tests

use crate::helpers::{TestEngineBuilder, down, drag, ms};
use flowcanvas::engine::EngineEvent;
use flowcanvas::geometry::{Size, point};
use flowcanvas::hit_test::hit_test;
use flowcanvas::input::PointerId;
use flowcanvas::overlay::{ExecutionEvent, StaticExecutionSource};
use flowcanvas::render::{DisplayList, DrawCommand, Layer, Palette};
use flowcanvas::settings::EngineSettings;
use flowcanvas::shapes::{Selection, ShapeBounds};
use std::time::Instant;

fn surface() -> DisplayList {
    DisplayList::new(Size::new(800.0, 600.0))
}

fn border_colors(list: &DisplayList) -> Vec<flowcanvas::render::Color> {
    list.layer_commands(Layer::Nodes)
        .into_iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeRect { stroke, .. } => Some(stroke.color),
            _ => None,
        })
        .collect()
}

#[test]
fn test_full_pass_layers_and_stats() {
    let mut engine = TestEngineBuilder::new()
        .with_group(10, (50.0, 50.0, 500.0, 200.0), &[1, 2])
        .with_shape(ShapeBounds::new(1, 100.0, 100.0, 150.0, 75.0).with_title("Loader"))
        .with_shape(ShapeBounds::new(2, 350.0, 100.0, 150.0, 75.0).with_title("Sampler"))
        .with_node(3, (9000.0, 9000.0, 10.0, 10.0))
        .with_link(1, 2)
        .build();

    let mut list = surface();
    let stats = engine.render(&mut list, Instant::now());

    assert_eq!(
        list.layers(),
        vec![
            Layer::Background,
            Layer::Grid,
            Layer::Groups,
            Layer::Connections,
            Layer::Nodes,
            Layer::LongPress
        ]
    );
    assert_eq!((stats.groups, stats.nodes, stats.links, stats.culled), (1, 2, 1, 1));
    assert_eq!(list.texts(), vec!["Sampler", "Loader"]);
    assert_eq!(engine.frame_monitor().total_frames(), 1);
}

#[test]
fn test_render_if_needed_tracks_dirty_state() {
    let mut engine = TestEngineBuilder::new()
        .with_node(1, (100.0, 100.0, 150.0, 75.0))
        .build();
    let now = Instant::now();

    assert!(engine.render_if_needed(&mut surface(), now).is_some());
    assert!(!engine.needs_redraw());
    assert!(engine.render_if_needed(&mut surface(), now).is_none());

    engine.handle(EngineEvent::Wheel {
        position: point(400.0, 300.0),
        delta_y: -100.0,
    });
    assert!(engine.needs_redraw());
}

#[test]
fn test_execution_border_beats_selection() {
    let mut engine = TestEngineBuilder::new()
        .with_node(1, (100.0, 100.0, 150.0, 75.0))
        .build();
    let palette = Palette::from_theme(&engine.settings().theme);
    engine.handle(EngineEvent::EnterReposition);
    drag(&mut engine, (150.0, 120.0), (150.0, 120.0), Instant::now());

    let mut list = surface();
    engine.render(&mut list, Instant::now());
    assert_eq!(border_colors(&list), vec![palette.selection]);

    engine.subscribe_execution(&StaticExecutionSource::default());
    engine.handle(EngineEvent::Execution(ExecutionEvent::NodeStart { node: 1 }));
    let mut list = surface();
    engine.render(&mut list, Instant::now());
    assert_eq!(border_colors(&list), vec![palette.executing]);
}

#[test]
fn test_long_press_ring_after_reveal() {
    let mut engine = TestEngineBuilder::new().build();
    let t0 = Instant::now();
    down(&mut engine, PointerId::Mouse, (200.0, 200.0), t0);

    let mut list = surface();
    engine.render(&mut list, t0 + ms(100));
    assert!(list.layer_commands(Layer::LongPress).is_empty());

    engine.handle(EngineEvent::Tick(t0 + ms(500)));
    assert!(engine.needs_redraw());
    let mut list = surface();
    engine.render(&mut list, t0 + ms(500));

    let ring = list.layer_commands(Layer::LongPress);
    assert_eq!(ring.len(), 2);
    assert!(ring.iter().all(|c| matches!(
        c,
        DrawCommand::Arc { center, .. } if *center == point(200.0, 200.0)
    )));
}

#[test]
fn test_theme_override_reaches_renderer() {
    let mut settings = EngineSettings::default();
    settings.theme.background = "#102030".into();
    let mut engine = TestEngineBuilder::new().with_settings(settings).build();

    let mut list = surface();
    engine.render(&mut list, Instant::now());
    let expected = flowcanvas::render::Color::from_hex("#102030").unwrap();
    assert!(matches!(
        list.commands().get(1),
        Some(DrawCommand::Clear { color }) if *color == expected
    ));

    let mut updated = engine.settings().clone();
    updated.theme.background = "#000000".into();
    engine.apply_settings(updated);
    let mut list = surface();
    engine.render(&mut list, Instant::now());
    assert!(matches!(
        list.commands().get(1),
        Some(DrawCommand::Clear { color }) if *color == flowcanvas::render::Color::BLACK
    ));
}

#[test]
fn test_fit_to_content_frames_layout() {
    let mut engine = TestEngineBuilder::new()
        .with_node(1, (1000.0, 1000.0, 200.0, 100.0))
        .with_node(2, (1400.0, 1200.0, 200.0, 100.0))
        .build();

    engine.fit_to_content(None);
    let t = engine.transform();
    let center = t.to_screen(point(1300.0, 1150.0));
    assert!(center.approx_eq(point(400.0, 300.0), 1e-2));
    assert!(t.scale <= 1.0);

    // Animated fit settles on the same transform
    engine.set_transform(flowcanvas::viewport::ViewportTransform::identity());
    let now = Instant::now();
    engine.fit_to_content(Some(now));
    assert!(engine.viewport().is_animating());
    engine.handle(EngineEvent::Tick(now + ms(1000)));
    assert_eq!(engine.transform(), t);
}

#[test]
fn test_topmost_node_is_the_hit_winner() {
    let mut engine = TestEngineBuilder::new()
        .with_shape(ShapeBounds::new(1, 100.0, 100.0, 150.0, 75.0).with_title("A"))
        .with_shape(ShapeBounds::new(2, 100.0, 100.0, 150.0, 75.0).with_title("B"))
        .build();

    let hit = hit_test(point(150.0, 130.0), engine.store(), None);
    assert_eq!(hit, Some(Selection::Node(1)));

    let mut list = surface();
    engine.render(&mut list, Instant::now());
    assert_eq!(list.texts().last(), Some(&"A"));
}

#[test]
fn test_higher_order_node_painted_last() {
    let mut engine = TestEngineBuilder::new()
        .with_shape(
            ShapeBounds::new(1, 100.0, 100.0, 150.0, 75.0)
                .with_title("Front")
                .with_order(3),
        )
        .with_shape(ShapeBounds::new(2, 100.0, 100.0, 150.0, 75.0).with_title("Back"))
        .build();

    let hit = hit_test(point(150.0, 130.0), engine.store(), None);
    assert_eq!(hit, Some(Selection::Node(1)));

    let mut list = surface();
    engine.render(&mut list, Instant::now());
    assert_eq!(list.texts(), vec!["Back", "Front"]);
}

#[test]
fn test_off_screen_node_emits_nothing() {
    let mut engine = TestEngineBuilder::new()
        .with_shape(ShapeBounds::new(1, 100.0, 100.0, 150.0, 75.0).with_title("Visible"))
        .with_shape(ShapeBounds::new(2, 5000.0, 5000.0, 150.0, 75.0).with_title("Far"))
        .build();

    let mut list = surface();
    let stats = engine.render(&mut list, Instant::now());
    assert_eq!((stats.nodes, stats.culled), (1, 1));
    assert_eq!(list.texts(), vec!["Visible"]);

    // Panning the far node into view draws it instead
    engine.set_transform(flowcanvas::viewport::ViewportTransform::new(-4900.0, -4900.0, 1.0));
    let mut list = surface();
    let stats = engine.render(&mut list, Instant::now());
    assert_eq!((stats.nodes, stats.culled), (1, 1));
    assert_eq!(list.texts(), vec!["Far"]);
}
