//! "3D-flavored" primitives drawn as oblique projections on the 2D canvas.
//!
//! Every solid carries a 2D footprint (`position`, `width`, `height`) plus a
//! `depth`. On the canvas the depth becomes an oblique offset; the 3D mirror
//! reinterprets the footprint as a volume.

use super::{GEOMETRY_EPSILON, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Oblique projection factor for the receding axis (half depth at 45°).
pub const OBLIQUE_FACTOR: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolidKind {
    Cube,
    Cuboid,
    Cylinder,
    Cone,
    Pyramid,
    HexagonalPrism,
    Sphere,
    Hemisphere,
    TriangularPrism,
}

impl SolidKind {
    pub const ALL: [SolidKind; 9] = [
        SolidKind::Cube,
        SolidKind::Cuboid,
        SolidKind::Cylinder,
        SolidKind::Cone,
        SolidKind::Pyramid,
        SolidKind::HexagonalPrism,
        SolidKind::Sphere,
        SolidKind::Hemisphere,
        SolidKind::TriangularPrism,
    ];

    /// Whether the depth is drawn as an oblique offset of the front face.
    pub fn is_oblique(self) -> bool {
        matches!(
            self,
            SolidKind::Cube
                | SolidKind::Cuboid
                | SolidKind::Pyramid
                | SolidKind::HexagonalPrism
                | SolidKind::TriangularPrism
        )
    }

    /// Whether the footprint width is a diameter.
    pub fn is_round(self) -> bool {
        matches!(
            self,
            SolidKind::Cylinder | SolidKind::Cone | SolidKind::Sphere | SolidKind::Hemisphere
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub(crate) id: ShapeId,
    pub kind: SolidKind,
    /// Top-left corner of the footprint.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub style: ShapeStyle,
}

impl Solid {
    pub fn new(kind: SolidKind, position: Point, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width: width.abs(),
            height: height.abs(),
            depth: depth.abs(),
            style: ShapeStyle::default(),
        }
    }

    /// Fit a solid of `kind` into the box spanned by a drag.
    pub fn from_drag(kind: SolidKind, anchor: Point, current: Point) -> Self {
        let rect = Rect::from_points(anchor, current);
        let (w, h) = (rect.width(), rect.height());
        let (width, height, depth) = match kind {
            SolidKind::Cube => {
                let side = w.max(h);
                (side, side, side)
            }
            SolidKind::Sphere => {
                let side = w.max(h);
                (side, side, 0.0)
            }
            SolidKind::Hemisphere => (w, h, 0.0),
            SolidKind::Cylinder | SolidKind::Cone => (w, h, (w * 0.3).min(h)),
            SolidKind::Cuboid
            | SolidKind::Pyramid
            | SolidKind::HexagonalPrism
            | SolidKind::TriangularPrism => (w, h, w.min(h) * 0.5),
        };
        Self::new(kind, rect.origin(), width, height, depth)
    }

    /// Front face of the footprint.
    pub fn footprint(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Screen-plane offset of the back face (zero for non-oblique kinds).
    pub fn depth_offset(&self) -> Vec2 {
        if self.kind.is_oblique() {
            Vec2::new(self.depth * OBLIQUE_FACTOR, -self.depth * OBLIQUE_FACTOR)
        } else {
            Vec2::ZERO
        }
    }

    /// Radius for round kinds.
    pub fn radius(&self) -> f64 {
        self.width / 2.0
    }
}

impl ShapeTrait for Solid {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let front = self.footprint();
        front.union(front + self.depth_offset())
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
        self.width < GEOMETRY_EPSILON || self.height < GEOMETRY_EPSILON
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
