//! Gesture state machine - one explicit state for every pointer interaction.
//!
//! Panning, shape dragging and pinch zoom are variants of a single enum, so at
//! most one of them can be active at any instant.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Pressed              (first pointer down)
//! Pressed -> Panning           (moved past drag threshold, no reposition target)
//! Pressed -> DraggingShape     (moved past drag threshold in reposition mode on a shape)
//! Any -> Pinching              (second pointer down)
//! Pinching -> Pressed          (back to one pointer; session marked as from_pinch)
//!
//! Any -> Idle                  (last pointer up, cancel, teardown)
//! ```

use super::pinch::PinchGesture;
use super::pointer::{PointerId, PointerSession};
use crate::shapes::Selection;

#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No pointer down
    #[default]
    Idle,

    /// One pointer down, not yet past the drag threshold
    Pressed(PointerSession),

    /// Dragging the camera
    Panning(PointerSession),

    /// Dragging a node or group in reposition mode
    DraggingShape(PointerSession),

    /// Two or more pointers down
    Pinching(PinchGesture),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning(_))
    }

    pub fn is_dragging_shape(&self) -> bool {
        matches!(self, Self::DraggingShape(_))
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self, Self::Pinching(_))
    }

    /// Returns true if any drag operation is active
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Panning(_) | Self::DraggingShape(_))
    }

    pub fn session(&self) -> Option<&PointerSession> {
        match self {
            Self::Pressed(s) | Self::Panning(s) | Self::DraggingShape(s) => Some(s),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut PointerSession> {
        match self {
            Self::Pressed(s) | Self::Panning(s) | Self::DraggingShape(s) => Some(s),
            _ => None,
        }
    }

    /// Whether `pointer` owns the current session.
    pub fn is_session_pointer(&self, pointer: PointerId) -> bool {
        self.session().is_some_and(|s| s.pointer == pointer)
    }

    /// Shape being dragged, if any
    pub fn dragged_shape(&self) -> Option<Selection> {
        match self {
            Self::DraggingShape(s) => s.reposition_target,
            _ => None,
        }
    }

    /// Take the session out, leaving Idle.
    pub fn take_session(&mut self) -> Option<PointerSession> {
        match std::mem::take(self) {
            Self::Pressed(s) | Self::Panning(s) | Self::DraggingShape(s) => Some(s),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Reset to Idle state
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Move a pressed session into its drag state.
    pub fn start_drag(&mut self, shape_drag: bool) {
        if let Some(mut session) = self.take_session() {
            session.dragging = true;
            *self = if shape_drag {
                Self::DraggingShape(session)
            } else {
                Self::Panning(session)
            };
        }
    }
}
