//! A surface that records draw calls instead of rasterizing them.

use crate::renderer::{Composite, Surface};
use kurbo::{Affine, BezPath, Point, Stroke};
use peniko::Color;

/// One recorded call.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Clear(Color),
    Stroke {
        style: Stroke,
        transform: Affine,
        color: Color,
        path: BezPath,
    },
    Fill {
        transform: Affine,
        color: Color,
        path: BezPath,
    },
    PushLayer(Composite),
    PopLayer,
    Text {
        transform: Affine,
        origin: Point,
        content: String,
        size: f64,
        color: Color,
    },
}

/// Keeps every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// Strokes with a dash pattern.
    pub fn dashed_strokes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { style, .. } if !style.dash_pattern.is_empty()))
            .count()
    }

    /// Strokes drawn with the identity transform (screen-space overlays).
    pub fn screen_strokes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { transform, .. } if *transform == Affine::IDENTITY))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        self.ops.push(DrawOp::Stroke {
            style: style.clone(),
            transform,
            color,
            path: path.clone(),
        });
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        self.ops.push(DrawOp::Fill {
            transform,
            color,
            path: path.clone(),
        });
    }

    fn push_layer(&mut self, composite: Composite) {
        self.ops.push(DrawOp::PushLayer(composite));
    }

    fn pop_layer(&mut self) {
        self.ops.push(DrawOp::PopLayer);
    }

    fn text(&mut self, transform: Affine, origin: Point, content: &str, size: f64, color: Color) {
        self.ops.push(DrawOp::Text {
            transform,
            origin,
            content: content.to_string(),
            size,
            color,
        });
    }
}
