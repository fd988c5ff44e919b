//! Rendering: a pure pass over borrowed engine state onto a host surface.

pub mod canvas;
pub mod display_list;
pub mod surface;

pub use canvas::{ModeFlags, RenderStats, RenderView, Renderer};
pub use display_list::{DisplayList, DrawCommand};
pub use surface::{Color, DrawSurface, Layer, Palette, Stroke};
