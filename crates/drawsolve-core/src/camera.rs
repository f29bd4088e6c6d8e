//! View transform for pan/zoom.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Maps world coordinates to screen coordinates.
///
/// `screen = world * scale + offset`. The scale is kept inside
/// `[min_scale, max_scale]`; the offset is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Current zoom factor.
    pub scale: f64,
    /// Current translation offset (pan) in screen pixels.
    pub offset: Vec2,
    /// Minimum allowed zoom level.
    pub min_scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            min_scale: 0.1,
            max_scale: 10.0,
        }
    }
}

impl ViewTransform {
    /// Identity transform with the given zoom band.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            scale: 1.0_f64.clamp(min_scale, max_scale),
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (translate, then scale).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&self, screen_point: Point, factor: f64) -> ViewTransform {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return *self;
        }

        let world_point = self.to_world(screen_point);
        // Solve screen_point = world_point * new_scale + offset for offset.
        let offset = screen_point.to_vec2() - world_point.to_vec2() * new_scale;

        ViewTransform {
            scale: new_scale,
            offset,
            ..*self
        }
    }

    /// The world-space rectangle currently visible in a viewport of `size`.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        let top_left = self.to_world(Point::ZERO);
        let bottom_right = self.to_world(Point::new(size.width, size.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Reset to identity, keeping the zoom band.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
    }
}
