//! Pointer move - long-press tolerance, drag threshold, panning, shape drag and pinch zoom.

use super::controller::{InputContext, InteractionController};
use super::pointer::PointerEvent;
use super::state::GestureState;
use crate::profile_scope;
use tracing::{debug, trace};

impl InteractionController {
    pub(super) fn handle_move(&mut self, event: &PointerEvent, cx: &mut InputContext<'_>) {
        profile_scope!("handle_move");

        // Hover moves of a pointer that is not down are ignored
        let Some(slot) = self.pointers.get_mut(&event.pointer) else {
            return;
        };
        *slot = event.position;

        if self.state.is_pinching() {
            self.update_pinch(cx);
            return;
        }

        let Some(session) = self.state.session_mut() else {
            return;
        };
        if session.pointer != event.pointer {
            return;
        }
        session.last = event.position;
        let distance = session.delta().length();
        let start_drag = !session.dragging && distance > self.settings.drag_threshold;
        let shape_drag = cx.reposition.is_active() && session.reposition_target.is_some();

        if self.long_press.is_pending()
            && self
                .long_press
                .exceeds_tolerance(event.position, self.settings.long_press_tolerance)
        {
            self.long_press.cancel();
        }

        if start_drag {
            self.long_press.cancel();
            self.state.start_drag(shape_drag);
            debug!(shape_drag, distance, "Drag started");
        }

        match &self.state {
            GestureState::DraggingShape(session) => {
                cx.reposition
                    .drag_to(session.delta(), cx.viewport.scale(), cx.store);
            }
            GestureState::Panning(session) => {
                let delta = session.delta();
                cx.viewport.pan_from(session.initial_viewport, delta);
                trace!(dx = delta.x, dy = delta.y, "pan");
            }
            _ => {}
        }
    }

    fn update_pinch(&mut self, cx: &mut InputContext<'_>) {
        // Zoom only with exactly two pointers; three or more suspend the pinch
        if self.pointers.len() != 2 {
            return;
        }
        let Some((a, b)) = self.pinch_pair() else {
            return;
        };
        let GestureState::Pinching(pinch) = &mut self.state else {
            return;
        };
        if let Some(step) = pinch.update(a, b) {
            cx.viewport.zoom_around(step.centroid, step.factor);
            trace!(factor = step.factor, scale = cx.viewport.scale(), "pinch");
        }
    }
}
