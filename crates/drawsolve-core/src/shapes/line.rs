//! Line and arrow shapes.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum perpendicular distance for a point to count as on a line.
pub const LINE_HIT_TOLERANCE: f64 = 5.0;

/// A straight segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    pub style: ShapeStyle,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

fn segment_bounds(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        segment_bounds(self.start, self.end)
    }

    fn hit_test(&self, point: Point) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= LINE_HIT_TOLERANCE
    }

    fn reference_point(&self) -> Point {
        self.start
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn is_degenerate(&self) -> bool {
        self.length() < GEOMETRY_EPSILON
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

/// A segment with an arrowhead at `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    pub style: ShapeStyle,
}

impl Arrow {
    /// Half-angle between the shaft and each barb.
    const HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Barb length, grows with the stroke width.
    pub fn head_length(&self) -> f64 {
        (self.style.line_width * 3.0).max(10.0)
    }

    /// The two barb tips of the arrowhead.
    pub fn head_points(&self) -> (Point, Point) {
        let angle = (self.end - self.start).atan2();
        let len = self.head_length();
        let barb = |offset: f64| {
            let a = angle + std::f64::consts::PI + offset;
            self.end + Vec2::new(a.cos(), a.sin()) * len
        };
        (barb(-Self::HEAD_ANGLE), barb(Self::HEAD_ANGLE))
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (left, right) = self.head_points();
        segment_bounds(self.start, self.end).union_pt(left).union_pt(right)
    }

    fn hit_test(&self, point: Point) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= LINE_HIT_TOLERANCE
    }

    fn reference_point(&self) -> Point {
        self.start
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn is_degenerate(&self) -> bool {
        self.length() < GEOMETRY_EPSILON
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
    fn test_line_creation() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!((line.length() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_on_line() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 0.0)));
        assert!(line.hit_test(Point::new(50.0, 4.9)));
        assert!(!line.hit_test(Point::new(50.0, 5.1)));
        assert!(!line.hit_test(Point::new(106.0, 0.0)));
    }

    #[test]
    fn test_zero_length_is_degenerate() {
        let p = Point::new(3.0, 3.0);
        assert!(Line::new(p, p).is_degenerate());
        assert!(Arrow::new(p, p).is_degenerate());
    }

    #[test]
    fn test_arrow_head_points_behind_tip() {
        let arrow = Arrow::new(Point::ZERO, Point::new(100.0, 0.0));
        let (a, b) = arrow.head_points();
        assert!(a.x < 100.0 && b.x < 100.0);
        assert!((a.y + b.y).abs() < 1e-9);
        assert!(arrow.bounds().contains(a));
    }
}
