//! flowcanvas - viewport, hit testing and gesture engine for node-graph editors.
//!
//! The engine owns the camera, hit-tests pointer input against node and group
//! bounds, recognizes taps, double taps, long presses, drags and pinches, runs
//! grid-snapped reposition sessions and folds remote execution progress into an
//! overlay. Rendering goes through the [`render::DrawSurface`] trait; what nodes
//! and links mean is left to the host.
//!
//! ## Modules
//!
//! - `engine` - Event queue, reducer and host callbacks
//! - `input` - Gesture state machine
//! - `viewport` - Camera transform and transitions
//! - `hit_test` / `spatial_index` - Point-in-shape queries
//! - `reposition` - Grid-snapped node and group dragging
//! - `overlay` - Execution progress overlay
//! - `render` - Draw pass and surfaces
//! - `settings` / `settings_watcher` - Configuration and hot reload

pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod perf;
pub mod render;
pub mod reposition;
pub mod settings;
pub mod settings_watcher;
pub mod shapes;
pub mod spatial_index;
pub mod viewport;

pub use engine::{Engine, EngineEvent, HostCall, HostCallbacks, NoopCallbacks, SharedEngine};
pub use error::{EngineError, EngineResult};
pub use geometry::{Point, Rect, Size, Vector, point};
pub use settings::EngineSettings;
pub use shapes::{GroupId, NodeId, Selection, ShapeBounds};
