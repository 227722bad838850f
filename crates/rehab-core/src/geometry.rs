//! Joint-angle geometry on normalized landmark coordinates.

use nalgebra::distance as point_distance;

use crate::types::Landmark;

/// Interior angle in degrees at vertex `b` formed by the rays `b→a` and `b→c`.
///
/// Computed from the difference of the two `atan2` bearings and folded into
/// `[0, 180]`. Coincident points give 0; non-finite coordinates give 0 rather
/// than propagating NaN into a detector.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut angle = radians.to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }

    if angle.is_finite() {
        angle.clamp(0.0, 180.0)
    } else {
        0.0
    }
}

/// Euclidean distance between two landmarks in the image plane
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    point_distance(&a.to_point2(), &b.to_point2())
}

/// Midpoint of two landmarks; visibility is the lower of the two
pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
    let visibility = match (a.visibility, b.visibility) {
        (Some(va), Some(vb)) => Some(va.min(vb)),
        (va, vb) => va.or(vb),
    };

    Landmark {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: (a.z + b.z) / 2.0,
        visibility,
    }
}
