//! The drawing seam between the renderer and the host's 2D context.

use crate::geometry::{Point, Rect, Size};
use crate::settings::Theme;
use serde::Serialize;

/// RGBA colour, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string like "#ffffff" or "#ffffff80"
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |i: usize| -> Option<f32> {
            Some(u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()? as f32 / 255.0)
        };
        let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Draw passes, in the order the renderer emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Background,
    Grid,
    Groups,
    Connections,
    Nodes,
    LongPress,
}

/// A host 2D drawing context. All coordinates are screen pixels.
pub trait DrawSurface {
    fn size(&self) -> Size;

    /// Marks the start of a draw pass. Most surfaces ignore it.
    fn begin_layer(&mut self, _layer: Layer) {}

    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color);
    fn stroke_rect(&mut self, rect: Rect, radius: f32, stroke: Stroke);
    fn line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn quad_curve(&mut self, from: Point, control: Point, to: Point, stroke: Stroke);
    /// Angles in radians, clockwise from the positive x axis
    fn arc(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32, stroke: Stroke);
    fn text(&mut self, position: Point, text: &str, size: f32, color: Color);
}

/// Theme colours parsed once per settings change.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub snap_grid: Color,
    pub node_fill: Color,
    pub node_border: Color,
    pub collapsed_fill: Color,
    pub group_fill: Color,
    pub group_border: Color,
    pub link: Color,
    pub text: Color,
    pub executing: Color,
    pub error: Color,
    pub progress: Color,
    pub selection: Color,
    pub authoring_active: Color,
    pub authoring_compatible: Color,
    pub long_press: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

impl Palette {
    /// Unparseable entries fall back to the default theme's colour.
    pub fn from_theme(theme: &Theme) -> Self {
        let defaults = Theme::default();
        let pick = |value: &str, fallback: &str| {
            Color::from_hex(value)
                .or_else(|| Color::from_hex(fallback))
                .unwrap_or(Color::BLACK)
        };
        Self {
            background: pick(&theme.background, &defaults.background),
            grid: pick(&theme.grid, &defaults.grid),
            snap_grid: pick(&theme.snap_grid, &defaults.snap_grid),
            node_fill: pick(&theme.node_fill, &defaults.node_fill),
            node_border: pick(&theme.node_border, &defaults.node_border),
            collapsed_fill: pick(&theme.collapsed_fill, &defaults.collapsed_fill),
            group_fill: pick(&theme.group_fill, &defaults.group_fill),
            group_border: pick(&theme.group_border, &defaults.group_border),
            link: pick(&theme.link, &defaults.link),
            text: pick(&theme.text, &defaults.text),
            executing: pick(&theme.executing, &defaults.executing),
            error: pick(&theme.error, &defaults.error),
            progress: pick(&theme.progress, &defaults.progress),
            selection: pick(&theme.selection, &defaults.selection),
            authoring_active: pick(&theme.authoring_active, &defaults.authoring_active),
            authoring_compatible: pick(&theme.authoring_compatible, &defaults.authoring_compatible),
            long_press: pick(&theme.long_press, &defaults.long_press),
        }
    }
}
