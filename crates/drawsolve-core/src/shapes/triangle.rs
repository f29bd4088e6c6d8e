//! Triangle shape.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait, bounds_of_points, triangle_area};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A triangle with three explicit vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    pub vertices: [Point; 3],
    pub style: ShapeStyle,
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices: [a, b, c],
            style: ShapeStyle::default(),
        }
    }

    /// Isosceles triangle inscribed in the drag box, apex on the anchor edge.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(
            Point::new((anchor.x + current.x) / 2.0, anchor.y),
            Point::new(anchor.x, current.y),
            Point::new(current.x, current.y),
        )
    }

    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        triangle_area(a, b, c)
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        bounds_of_points(&self.vertices)
    }

    fn hit_test(&self, point: Point) -> bool {
        let [a, b, c] = self.vertices;
        let total = triangle_area(a, b, c);
        if total < GEOMETRY_EPSILON {
            return false;
        }
        let parts = triangle_area(point, a, b) + triangle_area(point, b, c) + triangle_area(point, c, a);
        (parts - total).abs() <= total * 1e-9 + GEOMETRY_EPSILON
    }

    fn reference_point(&self) -> Point {
        self.vertices[0]
    }

    fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    fn is_degenerate(&self) -> bool {
        self.area() < GEOMETRY_EPSILON
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
