//! Ellipse shape.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub style: ShapeStyle,
}

impl Ellipse {
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x: radius_x.abs(),
            radius_y: radius_y.abs(),
            style: ShapeStyle::default(),
        }
    }

    /// Centered on the anchor with radii equal to the drag extent on each axis.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(anchor, current.x - anchor.x, current.y - anchor.y)
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius_x * 2.0, self.radius_y * 2.0))
    }

    fn hit_test(&self, point: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let nx = (point.x - self.center.x) / self.radius_x;
        let ny = (point.y - self.center.y) / self.radius_y;
        nx * nx + ny * ny <= 1.0
    }

    fn reference_point(&self) -> Point {
        self.center
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn is_degenerate(&self) -> bool {
        self.radius_x < GEOMETRY_EPSILON || self.radius_y < GEOMETRY_EPSILON
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
    fn test_hit_test_normalized() {
        let ellipse = Ellipse::new(Point::ZERO, 20.0, 10.0);
        assert!(ellipse.hit_test(Point::new(19.0, 0.0)));
        assert!(!ellipse.hit_test(Point::new(0.0, 11.0)));
        // Inside the bounding box but outside the curve.
        assert!(!ellipse.hit_test(Point::new(18.0, 9.0)));
    }

    #[test]
    fn test_flat_ellipse_is_degenerate() {
        let ellipse = Ellipse::from_drag(Point::ZERO, Point::new(10.0, 0.0));
        assert!(ellipse.is_degenerate());
        assert!(!ellipse.hit_test(Point::ZERO));
    }
}
