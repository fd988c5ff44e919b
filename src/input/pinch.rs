//! Two-finger pinch zoom.
//!
//! The zoom step is incremental: each move zooms by the ratio between the new
//! finger distance and the previous one, around the finger centroid.

use crate::geometry::Point;

/// Finger distances below this are treated as this, to keep ratios finite
const MIN_PINCH_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchStep {
    /// Screen-space pivot
    pub centroid: Point,
    pub factor: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PinchGesture {
    /// Distance between the two fingers at the last step; `None` while suspended
    baseline: Option<f32>,
}

impl PinchGesture {
    pub fn between(a: Point, b: Point) -> Self {
        Self {
            baseline: Some(a.distance(b).max(MIN_PINCH_DISTANCE)),
        }
    }

    pub fn suspended() -> Self {
        Self { baseline: None }
    }

    pub fn is_suspended(&self) -> bool {
        self.baseline.is_none()
    }

    pub fn suspend(&mut self) {
        self.baseline = None;
    }

    pub fn rebase(&mut self, a: Point, b: Point) {
        *self = Self::between(a, b);
    }

    /// Feed the current finger pair. A suspended pinch only re-establishes
    /// its baseline and yields no step.
    pub fn update(&mut self, a: Point, b: Point) -> Option<PinchStep> {
        let distance = a.distance(b).max(MIN_PINCH_DISTANCE);
        let step = self.baseline.map(|previous| PinchStep {
            centroid: a.midpoint(b),
            factor: distance / previous,
        });
        self.baseline = Some(distance);
        step
    }
}
