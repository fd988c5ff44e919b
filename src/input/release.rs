//! Pointer up / cancel - tap and double-tap resolution, pinch teardown.

use super::controller::{GestureOutcome, InputContext, InteractionController};
use super::pointer::{PointerEvent, PointerSession};
use super::state::GestureState;
use crate::profile_scope;
use tracing::debug;

impl InteractionController {
    /// `allow_tap` is false for cancellations, which never resolve a gesture.
    pub(super) fn handle_release(
        &mut self,
        event: &PointerEvent,
        allow_tap: bool,
        cx: &mut InputContext<'_>,
        out: &mut Vec<GestureOutcome>,
    ) {
        profile_scope!("handle_release");

        if self.pointers.shift_remove(&event.pointer).is_none() {
            return;
        }
        let remaining = self.pointers.len();

        if self.state.is_pinching() {
            match remaining {
                0 => self.state.reset(),
                1 => {
                    // The surviving finger starts over; no tap replay, no long press
                    let survivor = self.pointers.first().map(|(&p, &pos)| (p, pos));
                    if let Some((pointer, position)) = survivor {
                        self.open_session(pointer, position, event.time, true, cx, out);
                    }
                    debug!("Pinch ended");
                }
                2 => {
                    if let Some((a, b)) = self.pinch_pair() {
                        if let GestureState::Pinching(pinch) = &mut self.state {
                            pinch.rebase(a, b);
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        if !self.state.is_session_pointer(event.pointer) {
            return;
        }
        let Some(mut session) = self.state.take_session() else {
            return;
        };
        session.last = event.position;
        self.long_press.cancel();

        if allow_tap && session.is_tap_candidate() {
            self.resolve_tap(&session, event, cx, out);
        }
        debug!(
            dragged = session.dragging,
            long_pressed = session.long_pressed,
            cancelled = !allow_tap,
            "Pointer session closed"
        );
    }

    fn resolve_tap(
        &mut self,
        session: &PointerSession,
        event: &PointerEvent,
        cx: &mut InputContext<'_>,
        out: &mut Vec<GestureOutcome>,
    ) {
        match session.hit {
            Some(selection) => {
                self.taps.clear();
                // Reposition mode already selected on press
                if !cx.reposition.is_active() {
                    out.push(GestureOutcome::TapSelect {
                        selection: Some(selection),
                    });
                }
            }
            None => {
                if self.taps.register(event.position, event.time, &self.settings) {
                    out.push(GestureOutcome::DoubleTapInsert {
                        position: cx.viewport.to_world(event.position),
                    });
                } else {
                    out.push(GestureOutcome::TapSelect { selection: None });
                }
            }
        }
    }
}
