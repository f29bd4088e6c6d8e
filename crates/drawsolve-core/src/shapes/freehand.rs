//! Freehand drawing shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, bounds_of_points, point_to_polyline_dist};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extra slack around the stroke width when hit-testing a path.
const PATH_HIT_SLACK: f64 = 2.0;

/// How a path is composited onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Regular paint.
    #[default]
    Normal,
    /// Removes paint underneath (destination-out).
    Erase,
}

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in the freehand path, in drawing order.
    pub points: Vec<Point>,
    #[serde(default)]
    pub blend: BlendMode,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Freehand {
    /// Create a new empty freehand shape.
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            blend: BlendMode::Normal,
            style: ShapeStyle::default(),
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_eraser(&self) -> bool {
        self.blend == BlendMode::Erase
    }
}

impl Default for Freehand {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let half = self.style.line_width / 2.0;
        bounds_of_points(&self.points).inflate(half, half)
    }

    fn hit_test(&self, point: Point) -> bool {
        // Eraser strokes are paint, not selectable objects.
        if self.is_eraser() || self.points.len() < 2 {
            return false;
        }
        point_to_polyline_dist(point, &self.points) <= self.style.line_width + PATH_HIT_SLACK
    }

    fn reference_point(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freehand_creation() {
        let freehand = Freehand::new();
        assert!(freehand.is_empty());
        assert!(freehand.is_degenerate());
    }

    #[test]
    fn test_add_points() {
        let mut freehand = Freehand::new();
        freehand.add_point(Point::new(0.0, 0.0));
        freehand.add_point(Point::new(10.0, 10.0));
        assert_eq!(freehand.len(), 2);
        assert!(!freehand.is_degenerate());
    }

    #[test]
    fn test_hit_test_uses_line_width() {
        let mut freehand = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        freehand.style.line_width = 3.0;
        assert!(freehand.hit_test(Point::new(50.0, 5.0)));
        assert!(!freehand.hit_test(Point::new(50.0, 5.5)));
    }

    #[test]
    fn test_eraser_never_hit() {
        let mut freehand = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        freehand.blend = BlendMode::Erase;
        assert!(!freehand.hit_test(Point::new(50.0, 0.0)));
    }
}
