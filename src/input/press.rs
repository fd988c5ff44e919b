//! Pointer down - session creation, reposition selection, long-press arming.

use super::controller::{GestureOutcome, InputContext, InteractionController};
use super::pinch::PinchGesture;
use super::pointer::{PointerEvent, PointerId, PointerSession};
use super::state::GestureState;
use crate::geometry::Point;
use crate::hit_test::hit_test;
use crate::profile_scope;
use crate::shapes::Selection;
use std::time::Instant;
use tracing::debug;

impl InteractionController {
    pub(super) fn handle_press(
        &mut self,
        event: &PointerEvent,
        cx: &mut InputContext<'_>,
        out: &mut Vec<GestureOutcome>,
    ) {
        profile_scope!("handle_press");

        if self.pointers.contains_key(&event.pointer) {
            return;
        }
        self.pointers.insert(event.pointer, event.position);

        match self.pointers.len() {
            1 => self.open_session(event.pointer, event.position, event.time, false, cx, out),
            2 => {
                // Multi-touch never carries a session or a long press
                self.long_press.cancel();
                let pinch = self
                    .pinch_pair()
                    .map(|(a, b)| PinchGesture::between(a, b))
                    .unwrap_or_else(PinchGesture::suspended);
                self.state = GestureState::Pinching(pinch);
                debug!("Pinch started");
            }
            count => {
                self.long_press.cancel();
                match &mut self.state {
                    GestureState::Pinching(pinch) => pinch.suspend(),
                    state => *state = GestureState::Pinching(PinchGesture::suspended()),
                }
                debug!(pointers = count, "Pinch suspended");
            }
        }
    }

    pub(super) fn open_session(
        &mut self,
        pointer: PointerId,
        position: Point,
        time: Instant,
        from_pinch: bool,
        cx: &mut InputContext<'_>,
        out: &mut Vec<GestureOutcome>,
    ) {
        let world = cx.viewport.to_world(position);
        let hit = hit_test(world, cx.store, cx.authoring);
        let mut session =
            PointerSession::new(pointer, position, time, hit, cx.viewport.transform());
        session.from_pinch = from_pinch;

        if cx.reposition.is_active() {
            if let Some(selection) = hit.filter(|_| !from_pinch) {
                if cx.reposition.select(selection, cx.store) {
                    session.reposition_target = Some(selection);
                    out.push(GestureOutcome::RepositionSelect { selection });
                }
            }
        } else if cx.authoring.is_none() && !from_pinch {
            let target = match hit {
                Some(Selection::Node(id)) => Some(id),
                _ => None,
            };
            self.long_press
                .arm(position, world, target, time, &self.settings);
        }

        debug!(?pointer, ?hit, from_pinch, "Pointer session opened");
        self.state = GestureState::Pressed(session);
    }
}
