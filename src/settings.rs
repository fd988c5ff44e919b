//! Engine settings - tunable thresholds, grid, viewport limits and theme colours.
//!
//! Every numeric tolerance of the gesture engine lives here rather than being
//! hard-coded, so hosts can tune them per device. Settings are stored as JSON;
//! missing fields fall back to the defaults in [`crate::constants`].

use crate::constants::*;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Timing and distance tolerances for gesture recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Screen pixels of movement before a press becomes a drag
    pub drag_threshold: f32,
    /// Screen pixels of movement that cancel a pending long press
    pub long_press_tolerance: f32,
    /// Delay before the long-press indicator appears
    pub long_press_reveal_ms: u64,
    /// Total hold time for a long press
    pub long_press_duration_ms: u64,
    /// How long the indicator lingers after the long press fires
    pub long_press_linger_ms: u64,
    /// Double-tap time window
    pub double_tap_window_ms: u64,
    /// Double-tap distance window in screen pixels
    pub double_tap_distance: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
            long_press_tolerance: LONG_PRESS_TOLERANCE,
            long_press_reveal_ms: LONG_PRESS_REVEAL_MS,
            long_press_duration_ms: LONG_PRESS_DURATION_MS,
            long_press_linger_ms: LONG_PRESS_LINGER_MS,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            double_tap_distance: DOUBLE_TAP_DISTANCE,
        }
    }
}

impl GestureSettings {
    pub fn long_press_reveal(&self) -> Duration {
        Duration::from_millis(self.long_press_reveal_ms)
    }

    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_duration_ms)
    }

    pub fn long_press_linger(&self) -> Duration {
        Duration::from_millis(self.long_press_linger_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }
}

/// Camera limits and transition timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Screen margin kept around content by zoom-to-fit
    pub fit_margin: f32,
    pub animation_ms: u64,
    /// Extra screen margin before shapes are culled from a render pass
    pub culling_margin: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            fit_margin: FIT_MARGIN,
            animation_ms: VIEWPORT_ANIMATION_MS,
            culling_margin: CULLING_MARGIN,
        }
    }
}

impl ViewportSettings {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Scale bounds, repaired if the file swapped or zeroed them.
    pub fn scale_bounds(&self) -> (f32, f32) {
        let min = if self.min_scale > 0.0 { self.min_scale } else { MIN_SCALE };
        let max = if self.max_scale >= min { self.max_scale } else { MAX_SCALE.max(min) };
        (min, max)
    }
}

/// Reposition grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Grid spacing in world units
    pub size: f32,
    /// Snap capture radius in world units
    pub capture_radius: f32,
    /// Whether entering reposition mode turns snapping on
    pub snap_by_default: bool,
    /// The non-snapping background grid draws every Nth line
    pub coarse_multiple: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            capture_radius: SNAP_CAPTURE_RADIUS,
            snap_by_default: true,
            coarse_multiple: COARSE_GRID_MULTIPLE,
        }
    }
}

/// Hex colours used by the render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub grid: String,
    pub snap_grid: String,
    pub node_fill: String,
    pub node_border: String,
    pub collapsed_fill: String,
    pub group_fill: String,
    pub group_border: String,
    pub link: String,
    pub text: String,
    pub executing: String,
    pub error: String,
    pub progress: String,
    pub selection: String,
    pub authoring_active: String,
    pub authoring_compatible: String,
    pub long_press: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#1e1e24".into(),
            grid: "#2a2a33".into(),
            snap_grid: "#3a3a48".into(),
            node_fill: "#353540".into(),
            node_border: "#4a4a58".into(),
            collapsed_fill: "#2b2b34".into(),
            group_fill: "#26303a".into(),
            group_border: "#3d5a73".into(),
            link: "#7a8ba8".into(),
            text: "#e6e6ec".into(),
            executing: "#3fb950".into(),
            error: "#f85149".into(),
            progress: "#58a6ff".into(),
            selection: "#f0c000".into(),
            authoring_active: "#d2a8ff".into(),
            authoring_compatible: "#56d4dd".into(),
            long_press: "#ffffff".into(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub gesture: GestureSettings,
    pub viewport: ViewportSettings,
    pub grid: GridSettings,
    pub theme: Theme,
}

impl EngineSettings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "Loaded engine settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(EngineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Load from the per-user settings file, defaults if it does not exist.
    pub fn load_user() -> EngineResult<Self> {
        let path = default_settings_path().ok_or(EngineError::NoConfigDir)?;
        Ok(Self::load_or_default(&path))
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Per-user settings file location (`<config dir>/flowcanvas/settings.json`).
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowcanvas").join("settings.json"))
}
