//! Raw pointer events and the per-pointer session they open.

use crate::geometry::{Point, Vector};
use crate::shapes::Selection;
use crate::viewport::ViewportTransform;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input source of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

impl PointerId {
    pub fn is_touch(&self) -> bool {
        matches!(self, PointerId::Touch(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A host pointer event in screen coordinates, timestamped by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, phase: PointerPhase, position: Point, time: Instant) -> Self {
        Self {
            pointer,
            phase,
            position,
            time,
        }
    }

    pub fn down(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Down, position, time)
    }

    pub fn moved(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Move, position, time)
    }

    pub fn up(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Up, position, time)
    }

    pub fn cancel(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Cancel, position, time)
    }
}

/// State of one pressed pointer, from press until release or cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSession {
    pub pointer: PointerId,
    /// Press position, screen space
    pub start: Point,
    pub start_time: Instant,
    pub last: Point,
    /// Shape under the press point
    pub hit: Option<Selection>,
    /// Camera at press time; panning is measured from here
    pub initial_viewport: ViewportTransform,
    pub dragging: bool,
    /// Shape this pointer selected in reposition mode
    pub reposition_target: Option<Selection>,
    /// Opened when a pinch dropped back to one finger
    pub from_pinch: bool,
    pub long_pressed: bool,
}

impl PointerSession {
    pub fn new(
        pointer: PointerId,
        start: Point,
        start_time: Instant,
        hit: Option<Selection>,
        initial_viewport: ViewportTransform,
    ) -> Self {
        Self {
            pointer,
            start,
            start_time,
            last: start,
            hit,
            initial_viewport,
            dragging: false,
            reposition_target: None,
            from_pinch: false,
            long_pressed: false,
        }
    }

    /// Screen-space offset from the press point to the latest position.
    #[inline]
    pub fn delta(&self) -> Vector {
        self.last - self.start
    }

    /// Whether the session may still resolve as a tap on release.
    pub fn is_tap_candidate(&self) -> bool {
        !self.dragging && !self.long_pressed && !self.from_pinch
    }
}
