//! A recording [`DrawSurface`] for headless hosts and tests.

use super::surface::{Color, DrawSurface, Layer, Stroke};
use crate::geometry::{Point, Rect, Size};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Layer {
        layer: Layer,
    },
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        radius: f32,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        radius: f32,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    QuadCurve {
        from: Point,
        control: Point,
        to: Point,
        stroke: Stroke,
    },
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
        stroke: Stroke,
    },
    Text {
        position: Point,
        text: String,
        size: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop recorded commands, keeping the size.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Layers in the order they were drawn.
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Layer { layer } => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Commands recorded under `layer`.
    pub fn layer_commands(&self, layer: Layer) -> Vec<&DrawCommand> {
        let mut current = None;
        self.commands
            .iter()
            .filter(|c| {
                if let DrawCommand::Layer { layer: started } = c {
                    current = Some(*started);
                    return false;
                }
                current == Some(layer)
            })
            .collect()
    }

    /// Every text string drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for DisplayList {
    fn size(&self) -> Size {
        self.size
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::Layer { layer });
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            radius,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            radius,
            stroke,
        });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn quad_curve(&mut self, from: Point, control: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::QuadCurve {
            from,
            control,
            to,
            stroke,
        });
    }

    fn arc(&mut self, center: Point, radius: f32, start_angle: f32, sweep: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start_angle,
            sweep,
            stroke,
        });
    }

    fn text(&mut self, position: Point, text: &str, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.to_string(),
            size,
            color,
        });
    }
}
