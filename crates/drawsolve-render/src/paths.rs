//! Outline paths for each drawing object.

use drawsolve_core::shapes::{Arrow, Shape, Solid, SolidKind};
use kurbo::{BezPath, Point, Rect, Shape as _, Vec2};

/// Curve flattening tolerance in world units.
const PATH_TOLERANCE: f64 = 0.1;

/// Outline of a drawing object. Text has no outline and yields an empty path.
pub fn shape_path(shape: &Shape) -> BezPath {
    match shape {
        Shape::Freehand(path) => polyline(&path.points, false),
        Shape::Rectangle(rect) => rect.as_rect().to_path(PATH_TOLERANCE),
        Shape::Circle(circle) => kurbo::Circle::new(circle.center, circle.radius).to_path(PATH_TOLERANCE),
        Shape::Ellipse(ellipse) => {
            kurbo::Ellipse::new(ellipse.center, (ellipse.radius_x, ellipse.radius_y), 0.0).to_path(PATH_TOLERANCE)
        }
        Shape::Line(line) => polyline(&[line.start, line.end], false),
        Shape::Arrow(arrow) => arrow_path(arrow),
        Shape::Triangle(tri) => polyline(&tri.vertices, true),
        Shape::Polygon(poly) => polyline(&poly.points, true),
        Shape::Text(_) => BezPath::new(),
        Shape::Solid(solid) => solid_path(solid),
    }
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    if closed {
        path.close_path();
    }
    path
}

fn arrow_path(arrow: &Arrow) -> BezPath {
    let (left, right) = arrow.head_points();
    let mut path = polyline(&[arrow.start, arrow.end], false);
    path.move_to(left);
    path.line_to(arrow.end);
    path.line_to(right);
    path
}

/// Front face, receding face and the edges joining them.
fn extruded(front: &[Point], offset: Vec2) -> BezPath {
    let back: Vec<Point> = front.iter().map(|p| *p + offset).collect();
    let mut path = polyline(front, true);
    path.extend(polyline(&back, true).iter());
    for (f, b) in front.iter().zip(&back) {
        path.move_to(*f);
        path.line_to(*b);
    }
    path
}

fn solid_path(solid: &Solid) -> BezPath {
    let r = solid.footprint();
    let offset = solid.depth_offset();
    let center_x = r.center().x;
    match solid.kind {
        SolidKind::Cube | SolidKind::Cuboid => extruded(&corners(r), offset),
        SolidKind::TriangularPrism => extruded(
            &[Point::new(r.x0, r.y1), Point::new(r.x1, r.y1), Point::new(center_x, r.y0)],
            offset,
        ),
        SolidKind::HexagonalPrism => {
            let quarter = r.width() / 4.0;
            let mid_y = r.center().y;
            extruded(
                &[
                    Point::new(r.x0, mid_y),
                    Point::new(r.x0 + quarter, r.y0),
                    Point::new(r.x1 - quarter, r.y0),
                    Point::new(r.x1, mid_y),
                    Point::new(r.x1 - quarter, r.y1),
                    Point::new(r.x0 + quarter, r.y1),
                ],
                offset,
            )
        }
        SolidKind::Pyramid => {
            let base = [
                Point::new(r.x0, r.y1),
                Point::new(r.x1, r.y1),
                Point::new(r.x1, r.y1) + offset,
                Point::new(r.x0, r.y1) + offset,
            ];
            let apex = Point::new(center_x, r.y0) + offset / 2.0;
            let mut path = polyline(&base, true);
            for corner in base {
                path.move_to(corner);
                path.line_to(apex);
            }
            path
        }
        SolidKind::Cylinder => {
            let ry = solid.depth.min(r.height()) / 2.0;
            let top = Point::new(center_x, r.y0 + ry);
            let bottom = Point::new(center_x, r.y1 - ry);
            let rx = solid.radius();
            let mut path = kurbo::Ellipse::new(top, (rx, ry), 0.0).to_path(PATH_TOLERANCE);
            path.extend(kurbo::Ellipse::new(bottom, (rx, ry), 0.0).path_elements(PATH_TOLERANCE));
            path.extend(polyline(&[Point::new(r.x0, top.y), Point::new(r.x0, bottom.y)], false).iter());
            path.extend(polyline(&[Point::new(r.x1, top.y), Point::new(r.x1, bottom.y)], false).iter());
            path
        }
        SolidKind::Cone => {
            let ry = solid.depth.min(r.height()) / 2.0;
            let base = Point::new(center_x, r.y1 - ry);
            let apex = Point::new(center_x, r.y0);
            let mut path = kurbo::Ellipse::new(base, (solid.radius(), ry), 0.0).to_path(PATH_TOLERANCE);
            path.extend(polyline(&[Point::new(r.x0, base.y), apex, Point::new(r.x1, base.y)], false).iter());
            path
        }
        SolidKind::Sphere => {
            let radius = solid.radius().min(r.height() / 2.0);
            let center = Point::new(center_x, r.y0 + radius);
            let mut path = kurbo::Circle::new(center, radius).to_path(PATH_TOLERANCE);
            // Equator.
            path.extend(kurbo::Ellipse::new(center, (radius, radius * 0.3), 0.0).path_elements(PATH_TOLERANCE));
            path
        }
        SolidKind::Hemisphere => {
            let radius = solid.radius();
            let rim = Point::new(center_x, r.y1);
            let dome = kurbo::Arc::new(rim, (radius, r.height()), std::f64::consts::PI, std::f64::consts::PI, 0.0);
            let mut path = dome.to_path(PATH_TOLERANCE);
            path.move_to(Point::new(r.x0, r.y1));
            path.line_to(Point::new(r.x1, r.y1));
            path
        }
    }
}

fn corners(r: Rect) -> [Point; 4] {
    [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x1, r.y1),
        Point::new(r.x0, r.y1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawsolve_core::shapes::{Freehand, Line, Rectangle, Text};
    use kurbo::PathEl;
    use kurbo::Shape as _;

    fn count_moves(path: &BezPath) -> usize {
        path.elements().iter().filter(|el| matches!(el, PathEl::MoveTo(_))).count()
    }

    #[test]
    fn test_freehand_is_open_polyline() {
        let path = shape_path(&Shape::Freehand(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ])));
        assert_eq!(path.elements().len(), 3);
        assert!(!path.elements().iter().any(|el| matches!(el, PathEl::ClosePath)));
    }

    #[test]
    fn test_negative_rectangle_path_bounds() {
        let rect = Rectangle::new(Point::new(50.0, 30.0), -50.0, -30.0);
        let bbox = shape_path(&Shape::Rectangle(rect)).bounding_box();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 50.0, 30.0));
    }

    #[test]
    fn test_arrow_has_head() {
        let arrow = Arrow::new(Point::ZERO, Point::new(100.0, 0.0));
        let path = shape_path(&Shape::Arrow(arrow));
        assert_eq!(count_moves(&path), 2);
        let line = shape_path(&Shape::Line(Line::new(Point::ZERO, Point::new(100.0, 0.0))));
        assert_eq!(count_moves(&line), 1);
    }

    #[test]
    fn test_text_has_no_outline() {
        let text = Text::new(Point::ZERO, "x".into());
        assert!(shape_path(&Shape::Text(text)).elements().is_empty());
    }

    #[test]
    fn test_solids_stay_inside_bounds() {
        use drawsolve_core::shapes::ShapeTrait as _;
        for kind in SolidKind::ALL {
            let solid = Solid::new(kind, Point::new(10.0, 20.0), 40.0, 30.0, 12.0);
            let bounds = solid.bounds().inflate(0.5, 0.5);
            let path = solid_path(&solid);
            assert!(!path.elements().is_empty(), "{kind:?}");
            let bbox = path.bounding_box();
            assert!(bounds.contains(bbox.origin()) && bounds.contains(Point::new(bbox.x1, bbox.y1)), "{kind:?}: {bbox:?} vs {bounds:?}");
        }
    }
}
