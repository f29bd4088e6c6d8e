//! 3D mirror of the 2D object list.
//!
//! Each object's 2D footprint is reinterpreted as a volume standing on the
//! ground plane `y = 0`. Canvas `(x, y)` maps to world `(x / k, 0, -y / k)`,
//! so "down" on the canvas is "away from the camera" in the scene.
//!
//! Selection is approximate: the pointer ray is intersected with the ground
//! and the nearest node within a radius wins. There is no mesh raycasting.

use crate::canvas::CanvasDocument;
use crate::shapes::{SerializableColor, Shape, Solid, SolidKind};
use glam::{Mat4, Vec2, Vec3};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Thickness given to flat 2D shapes when extruded.
pub const PLATE_THICKNESS: f32 = 0.05;
/// Tube radius floor for strokes.
const MIN_TUBE_RADIUS: f32 = 0.01;

/// Canvas ↔ scene coordinate mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMapping {
    pub scale_factor: f64,
}

impl SceneMapping {
    pub fn new(scale_factor: f64) -> Self {
        Self { scale_factor }
    }

    pub fn to_scene(&self, p: Point) -> Vec3 {
        Vec3::new(
            (p.x / self.scale_factor) as f32,
            0.0,
            (-p.y / self.scale_factor) as f32,
        )
    }

    /// Inverse of [`Self::to_scene`]; the height is ignored.
    pub fn to_canvas(&self, v: Vec3) -> Point {
        Point::new(
            f64::from(v.x) * self.scale_factor,
            -f64::from(v.z) * self.scale_factor,
        )
    }

    pub fn length(&self, canvas_length: f64) -> f32 {
        (canvas_length / self.scale_factor) as f32
    }
}

/// Scene primitive for one mirrored object. Sizes are in scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
pub enum Primitive {
    Box { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    EllipticCylinder { radius_x: f32, radius_z: f32, height: f32 },
    Cone { radius: f32, height: f32 },
    Pyramid { base: f32, height: f32 },
    HexagonalPrism { radius: f32, height: f32 },
    TriangularPrism { base: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    Hemisphere { radius: f32 },
    /// Outline extruded by `height`; points are relative to the node position.
    Extrusion { outline: Vec<Vec3>, height: f32 },
    /// Polyline swept with a round cross-section.
    Tube { points: Vec<Vec3>, radius: f32, arrow_head: bool },
    Label { content: String, size: f32 },
}

/// A mirrored object placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Index of the source object in the 2D list.
    pub index: usize,
    pub primitive: Primitive,
    /// Center of the primitive's base footprint, lifted so it rests on the ground.
    pub position: Vec3,
    pub color: SerializableColor,
}

/// Mirror the whole object list. Eraser strokes have no volume and are skipped.
pub fn mirror_objects(objects: &[Shape], mapping: &SceneMapping) -> Vec<SceneNode> {
    objects
        .iter()
        .enumerate()
        .filter_map(|(index, shape)| mirror_shape(index, shape, mapping))
        .collect()
}

fn relative(points: &[Point], origin: Vec3, mapping: &SceneMapping) -> Vec<Vec3> {
    points.iter().map(|p| mapping.to_scene(*p) - origin).collect()
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len().max(1) as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

fn mirror_shape(index: usize, shape: &Shape, mapping: &SceneMapping) -> Option<SceneNode> {
    let lift = |h: f32| Vec3::Y * (h / 2.0);
    let tube_radius = mapping.length(shape.style().line_width / 2.0).max(MIN_TUBE_RADIUS);

    let (primitive, position) = match shape {
        Shape::Freehand(path) => {
            if path.is_eraser() {
                return None;
            }
            let origin = mapping.to_scene(centroid(&path.points));
            let points = relative(&path.points, origin, mapping);
            (Primitive::Tube { points, radius: tube_radius, arrow_head: false }, origin)
        }
        Shape::Line(line) => {
            let origin = mapping.to_scene(line.start.midpoint(line.end));
            let points = relative(&[line.start, line.end], origin, mapping);
            (Primitive::Tube { points, radius: tube_radius, arrow_head: false }, origin)
        }
        Shape::Arrow(arrow) => {
            let origin = mapping.to_scene(arrow.start.midpoint(arrow.end));
            let points = relative(&[arrow.start, arrow.end], origin, mapping);
            (Primitive::Tube { points, radius: tube_radius, arrow_head: true }, origin)
        }
        Shape::Rectangle(rect) => {
            let r = rect.as_rect();
            let size = Vec3::new(mapping.length(r.width()), PLATE_THICKNESS, mapping.length(r.height()));
            (Primitive::Box { size }, mapping.to_scene(r.center()) + lift(PLATE_THICKNESS))
        }
        Shape::Circle(circle) => (
            Primitive::Cylinder { radius: mapping.length(circle.radius), height: PLATE_THICKNESS },
            mapping.to_scene(circle.center) + lift(PLATE_THICKNESS),
        ),
        Shape::Ellipse(ellipse) => (
            Primitive::EllipticCylinder {
                radius_x: mapping.length(ellipse.radius_x),
                radius_z: mapping.length(ellipse.radius_y),
                height: PLATE_THICKNESS,
            },
            mapping.to_scene(ellipse.center) + lift(PLATE_THICKNESS),
        ),
        Shape::Triangle(tri) => {
            let origin = mapping.to_scene(centroid(&tri.vertices));
            let outline = relative(&tri.vertices, origin, mapping);
            (Primitive::Extrusion { outline, height: PLATE_THICKNESS }, origin)
        }
        Shape::Polygon(poly) => {
            let origin = mapping.to_scene(centroid(&poly.points));
            let outline = relative(&poly.points, origin, mapping);
            (Primitive::Extrusion { outline, height: PLATE_THICKNESS }, origin)
        }
        Shape::Text(text) => (
            Primitive::Label { content: text.content.clone(), size: mapping.length(text.font_size) },
            mapping.to_scene(text.position),
        ),
        Shape::Solid(solid) => mirror_solid(solid, mapping),
    };

    Some(SceneNode {
        index,
        primitive,
        position,
        color: shape.style().color,
    })
}

fn mirror_solid(solid: &Solid, mapping: &SceneMapping) -> (Primitive, Vec3) {
    let w = mapping.length(solid.width);
    let h = mapping.length(solid.height);
    let d = mapping.length(solid.depth);
    let base = mapping.to_scene(solid.footprint().center());
    let (primitive, height) = match solid.kind {
        SolidKind::Cube | SolidKind::Cuboid => (Primitive::Box { size: Vec3::new(w, h, d.max(PLATE_THICKNESS)) }, h),
        SolidKind::Cylinder => (Primitive::Cylinder { radius: w / 2.0, height: h }, h),
        SolidKind::Cone => (Primitive::Cone { radius: w / 2.0, height: h }, h),
        SolidKind::Pyramid => (Primitive::Pyramid { base: w, height: h }, h),
        SolidKind::HexagonalPrism => (Primitive::HexagonalPrism { radius: w / 2.0, height: h }, h),
        SolidKind::TriangularPrism => (
            Primitive::TriangularPrism { base: w, height: h, depth: d.max(PLATE_THICKNESS) },
            h,
        ),
        SolidKind::Sphere => (Primitive::Sphere { radius: w / 2.0 }, w),
        // Rests on its flat face.
        SolidKind::Hemisphere => (Primitive::Hemisphere { radius: w / 2.0 }, 0.0),
    };
    (primitive, base + Vec3::Y * (height / 2.0))
}

/// A ray in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Intersect a ray with the ground plane `y = 0`.
pub fn intersect_ground(ray: Ray) -> Option<Vec3> {
    if ray.direction.y.abs() < 1e-6 {
        return None;
    }
    let t = -ray.origin.y / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let mut hit = ray.origin + ray.direction * t;
    hit.y = 0.0;
    Some(hit)
}

/// Perspective camera looking at a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl OrbitCamera {
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far);
        proj * view
    }

    /// Ray through a cursor given in viewport pixels.
    pub fn ray_from_cursor(&self, cursor: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(2.0 * cursor.x / viewport.x - 1.0, 1.0 - 2.0 * cursor.y / viewport.y);
        let inverse = self.view_projection(viewport.x / viewport.y).inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).try_normalize()?;
        Some(Ray { origin: near, direction })
    }
}

/// Nearest node to `ground_point` on the ground plane within `radius`.
/// Later nodes win ties, matching 2D stacking.
pub fn pick_node(nodes: &[SceneNode], ground_point: Vec3, radius: f32) -> Option<usize> {
    let target = Vec2::new(ground_point.x, ground_point.z);
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (i, Vec2::new(node.position.x, node.position.z).distance(target)))
        .filter(|&(_, dist)| dist <= radius)
        .fold(None, |best: Option<(usize, f32)>, (i, dist)| match best {
            Some((_, best_dist)) if best_dist < dist => best,
            _ => Some((i, dist)),
        })
        .map(|(i, _)| nodes[i].index)
}

#[derive(Debug, Clone, Copy)]
struct SceneGrab {
    index: usize,
    offset: kurbo::Vec2,
    moved: bool,
}

/// Move-mode handling for the 3D view, writing through to the 2D document.
#[derive(Debug)]
pub struct SceneDrag {
    pub mapping: SceneMapping,
    pub pick_radius: f32,
    grab: Option<SceneGrab>,
}

impl SceneDrag {
    pub fn new(mapping: SceneMapping, pick_radius: f32) -> Self {
        Self {
            mapping,
            pick_radius,
            grab: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.grab.map(|g| g.index)
    }

    /// Select the node nearest the ground point.
    pub fn grab_at(&mut self, document: &CanvasDocument, ground_point: Vec3) -> Option<usize> {
        let nodes = mirror_objects(document.objects(), &self.mapping);
        let index = pick_node(&nodes, ground_point, self.pick_radius)?;
        let canvas_point = self.mapping.to_canvas(ground_point);
        self.grab = Some(SceneGrab {
            index,
            offset: canvas_point - document.objects()[index].reference_point(),
            moved: false,
        });
        Some(index)
    }

    /// Translate the grabbed object so it follows the ground point.
    pub fn drag_to(&mut self, document: &mut CanvasDocument, ground_point: Vec3) {
        let Some(grab) = self.grab.as_mut() else { return };
        let Some(shape) = document.objects().get(grab.index) else {
            self.grab = None;
            return;
        };
        let canvas_point = self.mapping.to_canvas(ground_point);
        let delta = (canvas_point - grab.offset) - shape.reference_point();
        if delta.hypot2() == 0.0 {
            return;
        }
        let moved = shape.translated(delta);
        document.replace(grab.index, moved);
        grab.moved = true;
    }

    /// Deselect, snapshotting if anything moved.
    pub fn release(&mut self, document: &mut CanvasDocument) {
        if let Some(grab) = self.grab.take() {
            if grab.moved {
                document.commit_current();
            }
        }
    }

    pub fn pointer_down(
        &mut self,
        document: &CanvasDocument,
        camera: &OrbitCamera,
        cursor: Vec2,
        viewport: Vec2,
    ) -> Option<usize> {
        let hit = camera.ray_from_cursor(cursor, viewport).and_then(intersect_ground)?;
        self.grab_at(document, hit)
    }

    pub fn pointer_move(
        &mut self,
        document: &mut CanvasDocument,
        camera: &OrbitCamera,
        cursor: Vec2,
        viewport: Vec2,
    ) {
        if let Some(hit) = camera.ray_from_cursor(cursor, viewport).and_then(intersect_ground) {
            self.drag_to(document, hit);
        }
    }

    pub fn pointer_up(&mut self, document: &mut CanvasDocument) {
        self.release(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Freehand, BlendMode, Rectangle};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_mapping_axes() {
        let mapping = SceneMapping::new(50.0);
        assert!(approx(mapping.to_scene(Point::new(100.0, 50.0)), Vec3::new(2.0, 0.0, -1.0)));
        let back = mapping.to_canvas(Vec3::new(2.0, 3.0, -1.0));
        assert!((back.x - 100.0).abs() < 1e-4 && (back.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_rectangle_becomes_thin_box() {
        let objects = vec![Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0))];
        let nodes = mirror_objects(&objects, &SceneMapping::new(50.0));
        assert_eq!(nodes.len(), 1);
        match &nodes[0].primitive {
            Primitive::Box { size } => assert!(approx(*size, Vec3::new(2.0, PLATE_THICKNESS, 1.0))),
            other => panic!("unexpected {other:?}"),
        }
        assert!(approx(nodes[0].position, Vec3::new(1.0, PLATE_THICKNESS / 2.0, -0.5)));
    }

    #[test]
    fn test_circle_becomes_short_cylinder() {
        let objects = vec![Shape::Circle(Circle::new(Point::new(50.0, 50.0), 25.0))];
        let nodes = mirror_objects(&objects, &SceneMapping::new(50.0));
        assert_eq!(
            nodes[0].primitive,
            Primitive::Cylinder { radius: 0.5, height: PLATE_THICKNESS }
        );
    }

    #[test]
    fn test_eraser_not_mirrored() {
        let mut eraser = Freehand::from_points(vec![Point::ZERO, Point::new(5.0, 5.0)]);
        eraser.blend = BlendMode::Erase;
        let objects = vec![
            Shape::Freehand(eraser),
            Shape::Circle(Circle::new(Point::ZERO, 5.0)),
        ];
        let nodes = mirror_objects(&objects, &SceneMapping::new(50.0));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].index, 1);
    }

    #[test]
    fn test_every_solid_rests_on_ground() {
        let mapping = SceneMapping::new(10.0);
        for kind in SolidKind::ALL {
            let solid = Solid::new(kind, Point::new(0.0, 0.0), 20.0, 20.0, 10.0);
            let (_, position) = mirror_solid(&solid, &mapping);
            assert!(position.y >= 0.0, "{kind:?}");
            assert!((position.x - 1.0).abs() < 1e-5 && (position.z + 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_center_ray_hits_target() {
        let camera = OrbitCamera {
            eye: Vec3::new(3.0, 8.0, 6.0),
            target: Vec3::new(3.0, 0.0, -2.0),
            ..OrbitCamera::default()
        };
        let viewport = Vec2::new(800.0, 600.0);
        let ray = camera.ray_from_cursor(viewport / 2.0, viewport).unwrap();
        let hit = intersect_ground(ray).unwrap();
        assert!(approx(hit, Vec3::new(3.0, 0.0, -2.0)));
    }

    #[test]
    fn test_parallel_or_backward_ray_misses() {
        let flat = Ray { origin: Vec3::new(0.0, 1.0, 0.0), direction: Vec3::X };
        assert!(intersect_ground(flat).is_none());
        let up = Ray { origin: Vec3::new(0.0, 1.0, 0.0), direction: Vec3::Y };
        assert!(intersect_ground(up).is_none());
    }

    #[test]
    fn test_pick_nearest_within_radius() {
        let objects = vec![
            Shape::Circle(Circle::new(Point::new(0.0, 0.0), 5.0)),
            Shape::Circle(Circle::new(Point::new(100.0, 0.0), 5.0)),
        ];
        let mapping = SceneMapping::new(50.0);
        let nodes = mirror_objects(&objects, &mapping);
        assert_eq!(pick_node(&nodes, Vec3::new(1.8, 0.0, 0.0), 0.5), Some(1));
        assert_eq!(pick_node(&nodes, Vec3::new(0.2, 0.0, 0.0), 0.5), Some(0));
        assert_eq!(pick_node(&nodes, Vec3::new(1.0, 0.0, 0.0), 0.5), None);
    }

    #[test]
    fn test_scene_drag_moves_2d_object() {
        let mut document = CanvasDocument::default();
        document.commit_shape(Shape::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)));
        let mut drag = SceneDrag::new(SceneMapping::new(50.0), 0.5);

        let start = Vec3::new(1.1, 0.0, -1.0);
        assert_eq!(drag.grab_at(&document, start), Some(0));
        drag.drag_to(&mut document, start + Vec3::new(1.0, 0.0, -2.0));
        drag.release(&mut document);

        let center = document.objects()[0].reference_point();
        assert!((center.x - 100.0).abs() < 1e-3);
        assert!((center.y - 150.0).abs() < 1e-3);
        assert!(document.undo());
        assert_eq!(document.objects()[0].reference_point(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_scene_drag_miss_keeps_history() {
        let mut document = CanvasDocument::default();
        document.commit_shape(Shape::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)));
        let mut drag = SceneDrag::new(SceneMapping::new(50.0), 0.5);
        assert_eq!(drag.grab_at(&document, Vec3::new(9.0, 0.0, 9.0)), None);
        drag.drag_to(&mut document, Vec3::ZERO);
        drag.release(&mut document);
        assert_eq!(document.objects()[0].reference_point(), Point::new(50.0, 50.0));
        assert!(!document.can_redo());
    }

    #[test]
    fn test_pointer_path_through_camera() {
        let mut document = CanvasDocument::default();
        document.commit_shape(Shape::Circle(Circle::new(Point::new(150.0, 100.0), 10.0)));
        let camera = OrbitCamera {
            eye: Vec3::new(3.0, 8.0, 6.0),
            target: Vec3::new(3.0, 0.0, -2.0),
            ..OrbitCamera::default()
        };
        let viewport = Vec2::new(800.0, 600.0);
        let mut drag = SceneDrag::new(SceneMapping::new(50.0), 0.5);
        assert_eq!(drag.pointer_down(&document, &camera, viewport / 2.0, viewport), Some(0));
        drag.pointer_up(&mut document);
        assert_eq!(drag.selected(), None);
    }
}
