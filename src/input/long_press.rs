//! Long-press detection with an explicit timer handle.
//!
//! The two deadlines (progress reveal and completion) live in
//! [`LongPressTimers`]. Every cancellation path clears the handle before
//! touching anything else, and [`LongPressState::tick`] only fires while the
//! completion deadline is still present, so a cancelled press can never fire.

use crate::geometry::Point;
use crate::settings::GestureSettings;
use crate::shapes::NodeId;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongPressPhase {
    #[default]
    Idle,
    Armed,
    ProgressVisible,
    Completed,
    Cancelled,
}

/// Pending deadlines of an armed long press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LongPressTimers {
    pub reveal_at: Option<Instant>,
    pub fire_at: Option<Instant>,
}

impl LongPressTimers {
    pub fn clear(&mut self) {
        self.reveal_at = None;
        self.fire_at = None;
    }

    pub fn is_set(&self) -> bool {
        self.reveal_at.is_some() || self.fire_at.is_some()
    }
}

/// What a completed long press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongPressFired {
    Node(NodeId),
    /// World coordinates of the press start
    Canvas(Point),
}

/// Progress ring drawn by the renderer, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongPressIndicator {
    pub center: Point,
    /// 0.0 at press, 1.0 at completion
    pub progress: f32,
}

#[derive(Debug, Clone, Default)]
pub struct LongPressState {
    phase: LongPressPhase,
    show_progress: bool,
    start_time: Option<Instant>,
    /// Press position, screen space
    start: Point,
    start_world: Point,
    target: Option<NodeId>,
    timers: LongPressTimers,
    duration: Duration,
    linger: Duration,
    linger_until: Option<Instant>,
}

impl LongPressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LongPressPhase {
        self.phase
    }

    pub fn timers(&self) -> LongPressTimers {
        self.timers
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Armed or showing progress, not yet fired.
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, LongPressPhase::Armed | LongPressPhase::ProgressVisible)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == LongPressPhase::Completed
    }

    pub fn is_visible(&self) -> bool {
        self.show_progress
    }

    pub fn arm(
        &mut self,
        start: Point,
        start_world: Point,
        target: Option<NodeId>,
        now: Instant,
        settings: &GestureSettings,
    ) {
        self.timers = LongPressTimers {
            reveal_at: Some(now + settings.long_press_reveal()),
            fire_at: Some(now + settings.long_press_duration()),
        };
        self.phase = LongPressPhase::Armed;
        self.show_progress = false;
        self.start_time = Some(now);
        self.start = start;
        self.start_world = start_world;
        self.target = target;
        self.duration = settings.long_press_duration();
        self.linger = settings.long_press_linger();
        self.linger_until = None;
    }

    /// True once `position` strays further than `tolerance` from the press.
    pub fn exceeds_tolerance(&self, position: Point, tolerance: f32) -> bool {
        self.start.distance(position) > tolerance
    }

    /// Cancel a pending press. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.timers.clear();
        if was_pending {
            self.phase = LongPressPhase::Cancelled;
            self.show_progress = false;
            debug!("Long press cancelled");
        }
        was_pending
    }

    /// Drop everything, including a lingering completed indicator.
    pub fn reset(&mut self) {
        self.timers.clear();
        *self = Self::default();
    }

    /// Advance deadlines to `now`. Returns the fired long press, at most once.
    pub fn tick(&mut self, now: Instant) -> Option<LongPressFired> {
        if self.phase == LongPressPhase::Completed {
            if self.linger_until.is_some_and(|until| now >= until) {
                self.phase = LongPressPhase::Idle;
                self.show_progress = false;
                self.linger_until = None;
            }
            return None;
        }

        if self.timers.reveal_at.is_some_and(|at| now >= at) {
            self.timers.reveal_at = None;
            self.show_progress = true;
            self.phase = LongPressPhase::ProgressVisible;
        }

        let fire_at = self.timers.fire_at?;
        if now < fire_at {
            return None;
        }
        self.timers.clear();
        self.phase = LongPressPhase::Completed;
        self.show_progress = true;
        self.linger_until = Some(fire_at + self.linger);

        let fired = match self.target {
            Some(id) => LongPressFired::Node(id),
            None => LongPressFired::Canvas(self.start_world),
        };
        debug!(?fired, "Long press fired");
        Some(fired)
    }

    /// Next deadline the host should wake up for, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.timers.reveal_at, self.timers.fire_at, self.linger_until]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn indicator(&self, now: Instant) -> Option<LongPressIndicator> {
        if !self.show_progress {
            return None;
        }
        let progress = match (self.phase, self.start_time) {
            (LongPressPhase::Completed, _) => 1.0,
            (_, Some(start)) if !self.duration.is_zero() => {
                (now.saturating_duration_since(start).as_secs_f32() / self.duration.as_secs_f32())
                    .clamp(0.0, 1.0)
            }
            _ => 0.0,
        };
        Some(LongPressIndicator {
            center: self.start,
            progress,
        })
    }
}
