//! Drawing object definitions.

mod circle;
mod ellipse;
mod freehand;
mod line;
mod polygon;
mod rectangle;
mod solid;
mod text;
mod triangle;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use freehand::{BlendMode, Freehand};
pub use line::{Arrow, Line};
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use solid::{Solid, SolidKind};
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Geometry smaller than this is treated as zero.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color string: {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for SerializableColor {
    type Err = ParseColorError;

    /// Accepts `#rrggbb`, `#rrggbbaa` and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
                return Err(err());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            let a = if hex.len() == 8 { channel(6)? } else { 255 };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a));
        }

        let inner = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<_, _>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Stroke properties shared by every drawing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub color: SerializableColor,
    /// Stroke width in world units.
    pub line_width: f64,
}

impl ShapeStyle {
    pub fn new(color: SerializableColor, line_width: f64) -> Self {
        Self { color, line_width }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.color.into()
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            line_width: 3.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Unsigned area of the triangle abc.
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((b - a).cross(c - a) / 2.0).abs()
}

/// Even-odd ray casting test.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = vi.x + (point.y - vi.y) * (vj.x - vi.x) / (vj.y - vi.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounds of a point set (`Rect::ZERO` when empty).
pub fn bounds_of_points(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Common trait for all drawing objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// World-space bounding box, always normalized (x0 <= x1, y0 <= y1).
    fn bounds(&self) -> Rect;

    /// Check if a world point lies on/in this shape.
    fn hit_test(&self, point: Point) -> bool;

    /// The point a move grab is measured against.
    fn reference_point(&self) -> Point;

    /// Translate every defining coordinate by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Geometry too small to be worth keeping (never committed).
    fn is_degenerate(&self) -> bool;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;
}

/// Tagged union of every drawing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Freehand(Freehand),
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Line(Line),
    Arrow(Arrow),
    Triangle(Triangle),
    Polygon(Polygon),
    Text(Text),
    Solid(Solid),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Freehand(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Triangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Text(s) => s,
            Shape::Solid(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Freehand(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Triangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Text(s) => s,
            Shape::Solid(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_trait().id()
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.as_trait().hit_test(point)
    }

    pub fn reference_point(&self) -> Point {
        self.as_trait().reference_point()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    /// A translated copy; the original is left untouched.
    pub fn translated(&self, delta: Vec2) -> Shape {
        let mut moved = self.clone();
        moved.translate(delta);
        moved
    }

    pub fn is_degenerate(&self) -> bool {
        self.as_trait().is_degenerate()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_trait_mut().style_mut()
    }

    /// Short lowercase name of the variant, as used in the serialized tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Freehand(_) => "freehand",
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Ellipse(_) => "ellipse",
            Shape::Line(_) => "line",
            Shape::Arrow(_) => "arrow",
            Shape::Triangle(_) => "triangle",
            Shape::Polygon(_) => "polygon",
            Shape::Text(_) => "text",
            Shape::Solid(_) => "solid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let c: SerializableColor = "#ff8000".parse().unwrap();
        assert_eq!(c, SerializableColor::rgb(255, 128, 0));
        let c: SerializableColor = "#00000080".parse().unwrap();
        assert_eq!(c.a, 128);
    }

    #[test]
    fn test_parse_rgb_color() {
        let c: SerializableColor = "rgb(10, 20, 30)".parse().unwrap();
        assert_eq!(c, SerializableColor::rgb(10, 20, 30));
        assert_eq!(c.to_string(), "rgb(10, 20, 30)");
    }

    #[test]
    fn test_parse_bad_color() {
        assert!("rgb(1,2)".parse::<SerializableColor>().is_err());
        assert!("#12345".parse::<SerializableColor>().is_err());
        assert!("blue".parse::<SerializableColor>().is_err());
        assert!("rgb(300, 0, 0)".parse::<SerializableColor>().is_err());
    }

    #[test]
    fn test_segment_distance() {
        let d = point_to_segment_dist(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);
        // Beyond the end clamps to the endpoint.
        let d = point_to_segment_dist(Point::new(13.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // U shape; the notch is outside.
        let u = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(!point_in_polygon(Point::new(15.0, 20.0), &u));
        assert!(point_in_polygon(Point::new(15.0, 5.0), &u));
    }

    #[test]
    fn test_bounds_of_points() {
        let b = bounds_of_points(&[Point::new(3.0, -1.0), Point::new(-2.0, 4.0)]);
        assert_eq!(b, Rect::new(-2.0, -1.0, 3.0, 4.0));
        assert_eq!(bounds_of_points(&[]), Rect::ZERO);
    }

    #[test]
    fn test_shape_serde_tag() {
        let shape = Shape::Circle(Circle::new(Point::new(1.0, 2.0), 3.0));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "circle");
        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }
}
