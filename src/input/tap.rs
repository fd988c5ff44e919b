//! Double-tap detection on empty canvas.
//!
//! No timer is involved: the previous tap is kept as a record and the next tap
//! compares against its timestamp and position.

use crate::geometry::Point;
use crate::settings::GestureSettings;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapRecord {
    /// Screen position of the tap
    pub position: Point,
    pub time: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct DoubleTapDetector {
    last: Option<TapRecord>,
}

impl DoubleTapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_tap(&self) -> Option<TapRecord> {
        self.last
    }

    /// Register a tap. Returns true if it completes a double tap, which also
    /// consumes the record so a third tap starts fresh.
    pub fn register(&mut self, position: Point, time: Instant, settings: &GestureSettings) -> bool {
        let is_double = self.last.is_some_and(|prev| {
            let elapsed = time.saturating_duration_since(prev.time);
            elapsed < settings.double_tap_window()
                && prev.position.distance(position) < settings.double_tap_distance
        });
        if is_double {
            self.last = None;
        } else {
            self.last = Some(TapRecord { position, time });
        }
        is_double
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
