//! Engine-wide default values.
//!
//! These are the product-tuned defaults. Every one of them can be overridden
//! through [`crate::settings::EngineSettings`]; code paths read the live settings,
//! not these constants directly.

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum viewport scale
pub const MIN_SCALE: f32 = 0.05;

/// Maximum viewport scale
pub const MAX_SCALE: f32 = 5.0;

/// Default viewport scale
pub const DEFAULT_SCALE: f32 = 1.0;

/// Margin in screen pixels kept around content by zoom-to-fit
pub const FIT_MARGIN: f32 = 50.0;

/// Scroll-wheel delta that halves/doubles the zoom factor divisor
pub const WHEEL_ZOOM_DIVISOR: f32 = 500.0;

/// Viewport transition duration in milliseconds
pub const VIEWPORT_ANIMATION_MS: u64 = 300;

// ============================================================================
// Gesture Thresholds
// ============================================================================

/// Movement in screen pixels before a press becomes a drag
pub const DRAG_THRESHOLD: f32 = 8.0;

/// Movement in screen pixels that cancels a pending long press
pub const LONG_PRESS_TOLERANCE: f32 = 8.0;

/// Delay before the long-press progress indicator is revealed
pub const LONG_PRESS_REVEAL_MS: u64 = 300;

/// Total hold time for a long press
pub const LONG_PRESS_DURATION_MS: u64 = 1000;

/// How long the long-press indicator stays visible after firing
pub const LONG_PRESS_LINGER_MS: u64 = 150;

/// Maximum time between two taps for a double tap
pub const DOUBLE_TAP_WINDOW_MS: u64 = 500;

/// Maximum screen distance between two taps for a double tap
pub const DOUBLE_TAP_DISTANCE: f32 = 50.0;

// ============================================================================
// Grid & Reposition
// ============================================================================

/// Grid spacing in world units
pub const GRID_SIZE: f32 = 20.0;

/// Distance in world units within which a dragged axis snaps to the grid
pub const SNAP_CAPTURE_RADIUS: f32 = 15.0;

/// The regular (non-snapping) background grid draws every Nth snap line
pub const COARSE_GRID_MULTIPLE: u32 = 5;

/// Grid lines closer than this on screen are skipped
pub const MIN_GRID_SCREEN_SPACING: f32 = 4.0;

/// A dragged position is written only if it moved more than this from the rendered one
pub const WRITE_EPSILON: f32 = 0.5;

/// A written position is recorded as a change only if it differs this much from the original
pub const CHANGE_EPSILON: f32 = 0.1;

// ============================================================================
// Hit Testing
// ============================================================================

/// Priority penalty applied to collapsed nodes
pub const COLLAPSED_PENALTY: i64 = 10_000;

/// Priority bonus for the active source/target while authoring a connection
pub const AUTHORING_ACTIVE_BONUS: i64 = 100_000;

/// Priority bonus for compatible target candidates while authoring a connection
pub const AUTHORING_COMPATIBLE_BONUS: i64 = 50_000;

// ============================================================================
// Rendering
// ============================================================================

/// Margin in pixels around viewport for culling (prevents pop-in at edges)
pub const CULLING_MARGIN: f32 = 50.0;

/// Height of the execution progress bar drawn along a node's bottom edge, in world units
pub const PROGRESS_BAR_HEIGHT: f32 = 4.0;

/// Screen radius of the long-press progress ring
pub const LONG_PRESS_RING_RADIUS: f32 = 28.0;

/// Node corner radius in world units
pub const NODE_CORNER_RADIUS: f32 = 6.0;

/// Render passes slower than this are reported
pub const TARGET_FRAME_MS: f64 = 16.67;

/// Shape title font size in world units
pub const TITLE_FONT_SIZE: f32 = 14.0;

/// Inset of a shape's title from its top-left corner, in world units
pub const TITLE_PADDING: f32 = 8.0;

/// Titles are skipped below this scale
pub const TITLE_MIN_SCALE: f32 = 0.3;

/// Connection stroke width in world units
pub const LINK_WIDTH: f32 = 2.0;
