//! 2D point math in pixel coordinates.

use serde::{Deserialize, Serialize};

/// Point or vector in image space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.sub(other).norm()
    }

    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Angle in degrees at vertex `b` between rays `b->a` and `b->c`
///
/// Returns `None` when either ray has zero length. The cosine is clamped to
/// [-1, 1] before `acos`, so the result always lies in [0, 180].
#[must_use]
pub fn vertex_angle(a: Point2, b: Point2, c: Point2) -> Option<f64> {
    let ba = a.sub(&b);
    let bc = c.sub(&b);

    let norm_ba = ba.norm();
    let norm_bc = bc.norm();
    if norm_ba == 0.0 || norm_bc == 0.0 {
        return None;
    }

    let cosine = (ba.dot(&bc) / (norm_ba * norm_bc)).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Orientation in degrees of the segment `from -> to`, in (-180, 180]
#[must_use]
pub fn segment_orientation(from: Point2, to: Point2) -> f64 {
    let v = to.sub(&from);
    let degrees = v.y.atan2(v.x).to_degrees();
    // atan2 yields -180 for a negative-zero y component
    if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Total length of the polyline through the given points
#[must_use]
pub fn chain_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}
