//! Pointer and touch input handling for the canvas.
//!
//! This module turns raw pointer events into camera moves, reposition drags and
//! semantic gestures (tap, double tap, long press, pinch).
//!
//! ## Architecture
//!
//! The input system uses an explicit state machine (`GestureState`) owned by the
//! [`InteractionController`]. Time is never read from the clock: every event
//! carries the host's timestamp and deadlines are polled with `tick(now)`.
//!
//! ## Modules
//!
//! - `state` - Gesture state machine enum and helper methods
//! - `pointer` - Pointer events and per-pointer sessions
//! - `press` - Pointer down handling (session, reposition selection, long-press arming)
//! - `drag` - Pointer move handling (drag threshold, pan, shape drag, pinch)
//! - `release` - Pointer up handling (tap, double tap, pinch teardown)
//! - `long_press` / `tap` / `pinch` - The individual recognizers

mod controller;
mod drag;
pub mod long_press;
pub mod pinch;
pub mod pointer;
mod press;
mod release;
mod state;
pub mod tap;

pub use controller::{GestureOutcome, InputContext, InteractionController};
pub use long_press::{LongPressFired, LongPressIndicator, LongPressPhase, LongPressState};
pub use pinch::PinchGesture;
pub use pointer::{PointerEvent, PointerId, PointerPhase, PointerSession};
pub use state::GestureState;
pub use tap::{DoubleTapDetector, TapRecord};
