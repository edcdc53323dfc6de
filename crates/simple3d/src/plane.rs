//! Plane representation and point classification.

use nalgebra::{Point3, Vector3};

use crate::transform::normalize_or_zero;

/// Points within this distance of a plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

impl PlaneSide {
    /// The side as seen from the flipped plane.
    pub fn opposite(self) -> Self {
        match self {
            PlaneSide::Front => PlaneSide::Back,
            PlaneSide::Back => PlaneSide::Front,
            PlaneSide::OnPlane => PlaneSide::OnPlane,
        }
    }
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// At least one vertex in front, none behind
    Front,
    /// At least one vertex behind, none in front
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices on both sides
    Spanning,
}

/// A plane through `origin` with a unit `normal`.
///
/// Distances are measured as `(p - origin) · normal`. A plane built from
/// degenerate input carries a zero normal; every point is then on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    origin: Point3<f64>,
    normal: Vector3<f64>,
}

impl Plane3D {
    /// Creates a plane from a point on it and a normal, normalizing the normal.
    pub fn from_point_and_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            origin,
            normal: normalize_or_zero(normal),
        }
    }

    /// Creates the plane through `a`, `b`, `c` with normal `(b - a) × (c - a)`.
    pub fn from_three_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::from_point_and_normal(a, (b - a).cross(&(c - a)))
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Returns the unit normal (zero for a degenerate plane).
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Signed distance from a point to the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Classifies a point using [`PLANE_EPSILON`].
    #[inline]
    pub fn classify_point(&self, point: &Point3<f64>) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > PLANE_EPSILON {
            PlaneSide::Front
        } else if dist < -PLANE_EPSILON {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns the same plane facing the opposite direction.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Point where the segment `start..end` crosses the plane.
    ///
    /// Returns `None` when the segment is near-parallel to the plane or the
    /// crossing falls on (or outside) an endpoint; endpoints are handled by
    /// point classification instead.
    pub fn intersect_segment(&self, start: &Point3<f64>, end: &Point3<f64>) -> Option<Point3<f64>> {
        let d1 = self.signed_distance(start);
        let d2 = self.signed_distance(end);
        let delta = d2 - d1;
        if delta.abs() <= PLANE_EPSILON {
            return None;
        }

        let t = -d1 / delta;
        if t <= PLANE_EPSILON || t >= 1.0 - PLANE_EPSILON {
            return None;
        }

        Some(start + (end - start) * t)
    }
}
