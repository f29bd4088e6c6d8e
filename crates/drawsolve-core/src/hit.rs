//! Topmost-object lookup.

use crate::shapes::Shape;
use kurbo::Point;

/// Index of the last-drawn object containing `point`, if any.
///
/// Linear scan from the top of the stack; object counts are interactive-scale.
pub fn find_topmost_at(objects: &[Shape], point: Point) -> Option<usize> {
    objects.iter().rposition(|shape| shape.hit_test(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Freehand, Line, Rectangle};

    fn scene() -> Vec<Shape> {
        vec![
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0)),
            Shape::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)),
            Shape::Line(Line::new(Point::new(200.0, 0.0), Point::new(300.0, 0.0))),
        ]
    }

    #[test]
    fn test_inside_rectangle() {
        assert_eq!(find_topmost_at(&scene(), Point::new(10.0, 10.0)), Some(0));
    }

    #[test]
    fn test_topmost_wins() {
        // Circle sits over the rectangle.
        assert_eq!(find_topmost_at(&scene(), Point::new(52.0, 52.0)), Some(1));
    }

    #[test]
    fn test_miss() {
        assert_eq!(find_topmost_at(&scene(), Point::new(150.0, 150.0)), None);
        assert_eq!(find_topmost_at(&[], Point::ZERO), None);
    }

    #[test]
    fn test_line_tolerance() {
        assert_eq!(find_topmost_at(&scene(), Point::new(250.0, 4.0)), Some(2));
    }

    #[test]
    fn test_path_over_rectangle() {
        let mut objects = scene();
        let mut path = Freehand::from_points(vec![Point::new(0.0, 20.0), Point::new(100.0, 20.0)]);
        path.style.line_width = 1.0;
        objects.push(Shape::Freehand(path));
        assert_eq!(find_topmost_at(&objects, Point::new(10.0, 22.0)), Some(3));
        assert_eq!(find_topmost_at(&objects, Point::new(10.0, 30.0)), Some(0));
    }
}
