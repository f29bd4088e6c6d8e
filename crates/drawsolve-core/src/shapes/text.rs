//! Text annotation shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-line text label anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub content: String,
    /// Font size in world units.
    pub font_size: f64,
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    /// Rough advance per character, as a fraction of the font size.
    const CHAR_WIDTH_RATIO: f64 = 0.6;
    const LINE_HEIGHT_RATIO: f64 = 1.2;

    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    /// Estimated extent without a font stack.
    pub fn approx_size(&self) -> (f64, f64) {
        let chars = self.content.chars().count() as f64;
        (
            chars * self.font_size * Self::CHAR_WIDTH_RATIO,
            self.font_size * Self::LINE_HEIGHT_RATIO,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (w, h) = self.approx_size();
        Rect::new(self.position.x, self.position.y, self.position.x + w, self.position.y + h)
    }

    fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    fn reference_point(&self) -> Point {
        self.position
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn is_degenerate(&self) -> bool {
        self.content.trim().is_empty() || self.font_size <= 0.0
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
