//! Camera state: pan/zoom transform, coordinate mapping and animated transitions.
//!
//! Screen = world * scale + translation. All zoom paths clamp the scale into the
//! configured limits instead of rejecting out-of-range requests.

use crate::constants::WHEEL_ZOOM_DIVISOR;
use crate::geometry::{Point, Rect, Size, Vector, point};
use crate::settings::ViewportSettings;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

/// Translation in screen pixels and a uniform scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewportTransform {
    #[inline]
    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn translation(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    /// Convert screen position to world position
    #[inline]
    pub fn to_world(&self, screen: Point) -> Point {
        point((screen.x - self.x) / self.scale, (screen.y - self.y) / self.scale)
    }

    /// Convert world position to screen position
    #[inline]
    pub fn to_screen(&self, world: Point) -> Point {
        point(world.x * self.scale + self.x, world.y * self.scale + self.y)
    }

    /// Convert a delta from screen to world (for drag operations)
    #[inline]
    pub fn delta_to_world(&self, delta: Vector) -> Vector {
        delta / self.scale
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        let origin = self.to_screen(world.origin());
        Rect::new(
            origin.x,
            origin.y,
            world.width * self.scale,
            world.height * self.scale,
        )
    }

    /// World-space rectangle covered by a canvas of `size`.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        let top_left = self.to_world(Point::ZERO);
        Rect::new(
            top_left.x,
            top_left.y,
            size.width / self.scale,
            size.height / self.scale,
        )
    }

    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self::new(
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
            from.scale + (to.scale - from.scale) * t,
        )
    }
}

/// Monotonic ease-out curve used for viewport transitions.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone)]
struct ViewportAnimation {
    from: ViewportTransform,
    to: ViewportTransform,
    start: Instant,
    duration: Duration,
}

/// The live camera of one editor session.
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewportTransform,
    min_scale: f32,
    max_scale: f32,
    animation: Option<ViewportAnimation>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportSettings::default())
    }
}

impl Viewport {
    pub fn new(settings: &ViewportSettings) -> Self {
        let (min_scale, max_scale) = settings.scale_bounds();
        Self {
            transform: ViewportTransform::identity(),
            min_scale,
            max_scale,
            animation: None,
        }
    }

    pub fn apply_settings(&mut self, settings: &ViewportSettings) {
        let (min_scale, max_scale) = settings.scale_bounds();
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.transform.scale = self.clamp_scale(self.transform.scale);
    }

    #[inline]
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn scale_limits(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    #[inline]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.transform.scale.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Replace the transform outright (scale is clamped). Stops any transition.
    pub fn set_transform(&mut self, transform: ViewportTransform) -> bool {
        self.animation = None;
        let next = ViewportTransform {
            scale: self.clamp_scale(transform.scale),
            ..transform
        };
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    #[inline]
    pub fn to_world(&self, screen: Point) -> Point {
        self.transform.to_world(screen)
    }

    #[inline]
    pub fn to_screen(&self, world: Point) -> Point {
        self.transform.to_screen(world)
    }

    /// Scale by `factor` keeping the world point under `pivot` fixed on screen.
    ///
    /// Returns true if the transform changed.
    pub fn zoom_around(&mut self, pivot: Point, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let world_under_pivot = self.transform.to_world(pivot);
        let new_scale = self.clamp_scale(self.transform.scale * factor);
        let next = ViewportTransform::new(
            pivot.x - world_under_pivot.x * new_scale,
            pivot.y - world_under_pivot.y * new_scale,
            new_scale,
        );
        trace!(factor, new_scale, "zoom_around");
        self.set_transform(next)
    }

    /// Scroll-wheel zoom: positive deltas zoom out.
    pub fn zoom_by_wheel(&mut self, pivot: Point, delta_y: f32) -> bool {
        let factor = 1.0 - delta_y / WHEEL_ZOOM_DIVISOR;
        if (factor - 1.0).abs() <= 0.001 {
            return false;
        }
        self.zoom_around(pivot, factor)
    }

    pub fn pan_by(&mut self, delta: Vector) -> bool {
        let mut next = self.transform;
        next.x += delta.x;
        next.y += delta.y;
        self.set_transform(next)
    }

    /// Pan relative to a captured starting transform (drag-from-origin panning).
    pub fn pan_from(&mut self, initial: ViewportTransform, delta: Vector) -> bool {
        self.set_transform(ViewportTransform::new(
            initial.x + delta.x,
            initial.y + delta.y,
            initial.scale,
        ))
    }

    /// Transform that centres `content` in `canvas`, never zooming past 1:1.
    pub fn fit_transform(&self, content: Rect, canvas: Size, margin: f32) -> ViewportTransform {
        let content_size = content.width.max(content.height);
        let available = (canvas.width - 2.0 * margin).min(canvas.height - 2.0 * margin);
        let scale = if content_size > 0.0 && available > 0.0 {
            (available / content_size).min(1.0)
        } else {
            1.0
        };
        let scale = self.clamp_scale(scale);
        let center = content.center();
        ViewportTransform::new(
            canvas.width / 2.0 - center.x * scale,
            canvas.height / 2.0 - center.y * scale,
            scale,
        )
    }

    pub fn fit_to(&mut self, content: Rect, canvas: Size, margin: f32) -> bool {
        let target = self.fit_transform(content, canvas, margin);
        self.set_transform(target)
    }

    /// Start an eased transition from the current live transform to `target`.
    pub fn animate_to(&mut self, target: ViewportTransform, duration: Duration, now: Instant) {
        let target = ViewportTransform {
            scale: self.clamp_scale(target.scale),
            ..target
        };
        if duration.is_zero() {
            self.set_transform(target);
            return;
        }
        self.animation = Some(ViewportAnimation {
            from: self.transform,
            to: target,
            start: now,
            duration,
        });
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the running transition to `now`. Returns true if the transform moved.
    pub fn sample(&mut self, now: Instant) -> bool {
        let Some(anim) = self.animation.as_ref() else {
            return false;
        };
        let elapsed = now.saturating_duration_since(anim.start);
        let t = (elapsed.as_secs_f32() / anim.duration.as_secs_f32()).min(1.0);
        let next = if t >= 1.0 {
            anim.to
        } else {
            ViewportTransform::lerp(&anim.from, &anim.to, ease_out_cubic(t))
        };
        if t >= 1.0 {
            self.animation = None;
        }
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    /// World-space rectangle currently visible on a canvas of `size`.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        self.transform.visible_world_rect(size)
    }
}
