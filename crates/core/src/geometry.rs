//! Planar joint-angle computation.

use crate::landmarks::LandmarkPoint;

/// Added to the vector-magnitude product so a degenerate (zero-length) edge
/// yields a finite cosine.
const MAGNITUDE_EPSILON: f64 = 1e-6;

/// Largest `|sin|` of the angle between two rays still treated as collinear.
/// Absorbs rounding in coordinates such as `0.1` that floats cannot hold
/// exactly.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Angle in degrees at vertex `p2` between the rays `p2 -> p1` and `p2 -> p3`.
///
/// Only the `(x, y)` projection is used; `z` and visibility are ignored.
/// Always returns a value in `[0, 180]`.
pub fn angle_at(p1: &LandmarkPoint, p2: &LandmarkPoint, p3: &LandmarkPoint) -> f64 {
    let (ax, ay) = (p1.x - p2.x, p1.y - p2.y);
    let (bx, by) = (p3.x - p2.x, p3.y - p2.y);

    let dot = ax * bx + ay * by;
    let magnitudes = ax.hypot(ay) * bx.hypot(by);

    // Rays along the same direction: the epsilon below would otherwise leave
    // a small non-zero residue.
    let cross = ax * by - ay * bx;
    if dot > 0.0 && cross.abs() <= COLLINEAR_TOLERANCE * magnitudes {
        return 0.0;
    }

    let cosine = (dot / (magnitudes + MAGNITUDE_EPSILON)).clamp(-1.0, 1.0);

    cosine.acos().to_degrees()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
