//! The interaction controller owns every piece of gesture state.
//!
//! It is the only writer of the pointer sessions, the long-press timers and the
//! tap record. Everything else it touches (camera, bounds, reposition session)
//! is lent to it per event through [`InputContext`]. Recognized gestures come
//! back as [`GestureOutcome`]s for the engine to dispatch to host callbacks.

use super::long_press::{LongPressFired, LongPressState};
use super::pointer::{PointerEvent, PointerId, PointerPhase};
use super::state::GestureState;
use super::tap::DoubleTapDetector;
use crate::geometry::Point;
use crate::hit_test::ConnectionAuthoring;
use crate::reposition::RepositionController;
use crate::settings::GestureSettings;
use crate::shapes::{BoundsStore, NodeId, Selection};
use crate::viewport::Viewport;
use indexmap::IndexMap;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Mutable engine state the controller works on for one event.
pub struct InputContext<'a> {
    pub viewport: &'a mut Viewport,
    pub store: &'a mut BoundsStore,
    pub reposition: &'a mut RepositionController,
    pub authoring: Option<&'a ConnectionAuthoring>,
}

/// A recognized gesture, reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureOutcome {
    /// Tap on a shape, or `None` for a tap on empty canvas
    TapSelect { selection: Option<Selection> },
    /// Second tap of a double tap, world coordinates
    DoubleTapInsert { position: Point },
    NodeLongPress { node: NodeId },
    /// World coordinates of the press start
    CanvasLongPress { position: Point },
    /// Shape selected on press in reposition mode
    RepositionSelect { selection: Selection },
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    pub(super) settings: GestureSettings,
    pub(super) state: GestureState,
    /// Every pointer currently down, in press order
    pub(super) pointers: IndexMap<PointerId, Point>,
    pub(super) long_press: LongPressState,
    pub(super) taps: DoubleTapDetector,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl InteractionController {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            settings: settings.clone(),
            state: GestureState::Idle,
            pointers: IndexMap::new(),
            long_press: LongPressState::new(),
            taps: DoubleTapDetector::new(),
        }
    }

    /// New tolerances apply from the next press.
    pub fn apply_settings(&mut self, settings: &GestureSettings) {
        self.settings = settings.clone();
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn long_press(&self) -> &LongPressState {
        &self.long_press
    }

    pub fn taps(&self) -> &DoubleTapDetector {
        &self.taps
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Feed one pointer event.
    pub fn process(
        &mut self,
        event: &PointerEvent,
        cx: &mut InputContext<'_>,
    ) -> Vec<GestureOutcome> {
        let mut out = Vec::new();
        // Deadlines that passed before this event resolve first
        out.extend(self.tick(event.time));

        match event.phase {
            PointerPhase::Down => self.handle_press(event, cx, &mut out),
            PointerPhase::Move => self.handle_move(event, cx),
            PointerPhase::Up => self.handle_release(event, true, cx, &mut out),
            PointerPhase::Cancel => self.handle_release(event, false, cx, &mut out),
        }
        out
    }

    /// Advance the long-press deadlines.
    pub fn tick(&mut self, now: Instant) -> Option<GestureOutcome> {
        let fired = self.long_press.tick(now)?;
        if let Some(session) = self.state.session_mut() {
            session.long_pressed = true;
        }
        Some(match fired {
            LongPressFired::Node(node) => GestureOutcome::NodeLongPress { node },
            LongPressFired::Canvas(position) => GestureOutcome::CanvasLongPress { position },
        })
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.long_press.next_deadline()
    }

    /// Abandon the current gesture: timers, sessions and pinch. Used when
    /// entering reposition or connection-authoring mode.
    pub fn cancel_gesture(&mut self) {
        self.long_press.reset();
        self.pointers.clear();
        if !self.state.is_idle() {
            debug!("Gesture cancelled");
        }
        self.state.reset();
    }

    pub fn teardown(&mut self) {
        self.cancel_gesture();
        self.taps.clear();
    }

    /// First two pointers in press order.
    pub(super) fn pinch_pair(&self) -> Option<(Point, Point)> {
        let mut positions = self.pointers.values();
        Some((*positions.next()?, *positions.next()?))
    }
}
