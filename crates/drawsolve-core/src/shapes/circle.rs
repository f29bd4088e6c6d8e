//! Circle shape.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle given by center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius: f64,
    pub style: ShapeStyle,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius: radius.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    /// Centered on the anchor, passing through the current point.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(anchor, (current - anchor).hypot())
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
    }

    fn hit_test(&self, point: Point) -> bool {
        (point - self.center).hypot() <= self.radius
    }

    fn reference_point(&self) -> Point {
        self.center
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn is_degenerate(&self) -> bool {
        self.radius < GEOMETRY_EPSILON
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
    fn test_from_drag() {
        let circle = Circle::from_drag(Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert!((circle.radius - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_hit_test() {
        let circle = Circle::new(Point::ZERO, 10.0);
        assert!(circle.hit_test(Point::new(6.0, 8.0)));
        assert!(!circle.hit_test(Point::new(8.0, 8.0)));
    }

    #[test]
    fn test_negative_radius_clamped() {
        assert!(Circle::new(Point::ZERO, -4.0).is_degenerate());
    }
}
