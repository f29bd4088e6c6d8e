//! Polygon shape.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait, bounds_of_points, point_in_polygon};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed polygon over an ordered vertex list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: ShapeStyle::default(),
        }
    }

    /// Regular polygon around `center`, first vertex pointing straight up.
    pub fn regular(center: Point, radius: f64, sides: usize) -> Self {
        let sides = sides.max(3);
        let step = std::f64::consts::TAU / sides as f64;
        let points = (0..sides)
            .map(|i| {
                let a = -std::f64::consts::FRAC_PI_2 + step * i as f64;
                center + Vec2::new(a.cos(), a.sin()) * radius
            })
            .collect();
        Self::new(points)
    }

    /// Shoelace area.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let (a, b) = (self.points[i], self.points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        (twice / 2.0).abs()
    }
}

impl ShapeTrait for Polygon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        bounds_of_points(&self.points)
    }

    fn hit_test(&self, point: Point) -> bool {
        point_in_polygon(point, &self.points)
    }

    fn reference_point(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area() < GEOMETRY_EPSILON
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
