//! Unit tests for the viewport transform.

use flowcanvas::geometry::{Rect, Size, Vector, point};
use flowcanvas::settings::ViewportSettings;
use flowcanvas::viewport::{Viewport, ViewportTransform};
use std::time::{Duration, Instant};

fn viewport() -> Viewport {
    Viewport::new(&ViewportSettings::default())
}

#[test]
fn test_zoom_always_clamped() {
    let mut vp = viewport();
    let pivot = point(400.0, 300.0);
    for factor in [0.5, 0.1, 0.01, 3.0, 10.0, 100.0, 0.2, f32::MAX, f32::MIN_POSITIVE] {
        vp.zoom_around(pivot, factor);
        let scale = vp.scale();
        assert!((0.05..=5.0).contains(&scale), "scale {scale} out of range");
    }
    for delta in [-5000.0, 5000.0, -250.0, 250.0] {
        vp.zoom_by_wheel(pivot, delta);
        assert!((0.05..=5.0).contains(&vp.scale()));
    }
}

#[test]
fn test_round_trip_points() {
    let transforms = [
        ViewportTransform::identity(),
        ViewportTransform::new(-120.5, 33.25, 0.37),
        ViewportTransform::new(800.0, -640.0, 4.2),
    ];
    let points = [point(0.0, 0.0), point(150.0, 120.0), point(-987.5, 42.125)];
    for t in transforms {
        for p in points {
            let back = t.to_screen(t.to_world(p));
            assert!(back.approx_eq(p, 1e-2), "{p:?} -> {back:?} under {t:?}");
            let back = t.to_world(t.to_screen(p));
            assert!(back.approx_eq(p, 1e-2), "{p:?} -> {back:?} under {t:?}");
        }
    }
}

#[test]
fn test_zoom_keeps_pivot_fixed() {
    let mut vp = viewport();
    vp.set_transform(ViewportTransform::new(30.0, -10.0, 1.5));
    let pivot = point(250.0, 180.0);
    let world_before = vp.to_world(pivot);

    vp.zoom_around(pivot, 1.8);
    assert!(vp.to_world(pivot).approx_eq(world_before, 1e-3));
}

#[test]
fn test_pan_from_initial() {
    let mut vp = viewport();
    let initial = vp.transform();
    vp.pan_from(initial, Vector::new(60.0, 35.0));
    vp.pan_from(initial, Vector::new(10.0, 5.0));
    assert_eq!(vp.transform(), ViewportTransform::new(10.0, 5.0, 1.0));
}

#[test]
fn test_fit_never_zooms_past_one() {
    let vp = viewport();
    let small = Rect::new(0.0, 0.0, 10.0, 10.0);
    let t = vp.fit_transform(small, Size::new(800.0, 600.0), 50.0);
    assert_eq!(t.scale, 1.0);
    assert!(t.to_screen(small.center()).approx_eq(point(400.0, 300.0), 1e-3));
}

#[test]
fn test_transition_reaches_target() {
    let mut vp = viewport();
    let start = Instant::now();
    let target = ViewportTransform::new(100.0, 50.0, 2.0);
    vp.animate_to(target, Duration::from_millis(300), start);
    assert!(vp.is_animating());

    vp.sample(start + Duration::from_millis(150));
    let mid = vp.transform();
    assert!(mid.scale > 1.0 && mid.scale < 2.0);

    vp.sample(start + Duration::from_millis(300));
    assert!(!vp.is_animating());
    assert_eq!(vp.transform(), target);
}

#[test]
fn test_set_transform_interrupts_transition() {
    let mut vp = viewport();
    let start = Instant::now();
    vp.animate_to(ViewportTransform::new(100.0, 0.0, 2.0), Duration::from_millis(300), start);
    vp.set_transform(ViewportTransform::new(5.0, 5.0, 1.0));
    assert!(!vp.is_animating());
    assert!(!vp.sample(start + Duration::from_millis(500)));
    assert_eq!(vp.transform(), ViewportTransform::new(5.0, 5.0, 1.0));
}

#[test]
fn test_visible_world_rect_follows_pan_and_zoom() {
    let mut vp = viewport();
    vp.set_transform(ViewportTransform::new(-200.0, 100.0, 2.0));

    let visible = vp.visible_world_rect(Size::new(800.0, 600.0));
    assert_eq!(visible, Rect::new(100.0, -50.0, 400.0, 300.0));
    assert_eq!(vp.to_world(point(800.0, 600.0)), point(500.0, 250.0));
}
