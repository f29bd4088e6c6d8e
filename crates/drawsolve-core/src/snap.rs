//! Angle snapping for straight strokes.

use kurbo::Point;

/// Angle snap increment in degrees (octants).
pub const ANGLE_SNAP_INCREMENT: f64 = 45.0;

/// Result of an angle snap operation.
#[derive(Debug, Clone, Copy)]
pub struct AngleSnapResult {
    /// The snapped endpoint.
    pub point: Point,
    /// The snapped angle in degrees (0-360).
    pub angle_degrees: f64,
    /// Distance from start point (preserved from original).
    pub distance: f64,
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    snapped.rem_euclid(360.0)
}

/// Rotate `end` around `start` onto the nearest snap direction, keeping the distance.
pub fn snap_line_endpoint(start: Point, end: Point) -> AngleSnapResult {
    let delta = end - start;
    let distance = delta.hypot();

    if distance < 0.001 {
        return AngleSnapResult {
            point: end,
            angle_degrees: 0.0,
            distance: 0.0,
        };
    }

    let original = delta.y.atan2(delta.x).to_degrees().rem_euclid(360.0);
    let snapped = snap_angle(original, ANGLE_SNAP_INCREMENT);
    let radians = snapped.to_radians();

    AngleSnapResult {
        point: Point::new(start.x + distance * radians.cos(), start.y + distance * radians.sin()),
        angle_degrees: snapped,
        distance,
    }
}
