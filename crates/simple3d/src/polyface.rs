//! World-space polygons, the unit the BSP tree works on.

use nalgebra::{Point3, Vector3};

use crate::{Classification, Color, Plane3D, PlaneSide, PLANE_EPSILON};

/// A convex, fully materialized polygon in world space.
///
/// The plane is derived once from the first three vertices; vertices are
/// never mutated afterwards. Vertices should be coplanar and wound
/// counter-clockwise when viewed from the front.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyface {
    vertices: Vec<Point3<f64>>,
    color: Color,
    plane: Plane3D,
}

impl Polyface {
    /// Creates a polyface from at least three vertices.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(color: Color, vertices: Vec<Point3<f64>>) -> Self {
        debug_assert!(vertices.len() >= 3, "Polyface must have at least 3 vertices");
        let plane = Plane3D::from_three_points(vertices[0], vertices[1], vertices[2]);
        Self {
            vertices,
            color,
            plane,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// The plane through the first vertex, used as splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Unit normal from the first three vertices (zero if they are collinear).
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal()
    }

    /// Average of all vertices.
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Returns the same polygon with reversed winding (and negated normal).
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self::new(self.color, vertices)
    }

    /// Classifies this polygon against a plane.
    ///
    /// On-plane vertices count toward neither side, so a polygon touching the
    /// plane with one edge is still `Front` or `Back`.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for vertex in &self.vertices {
            match plane.classify_point(vertex) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => Classification::Coplanar,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }

    /// Whether every turn of the outline bends the same way around the normal.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return true;
        }

        let normal = self.normal();
        let mut initial_sign: Option<f64> = None;
        for i in 0..n {
            let prev = self.vertices[i];
            let curr = self.vertices[(i + 1) % n];
            let next = self.vertices[(i + 2) % n];
            let turn = (curr - prev).cross(&(next - curr)).dot(&normal);

            if turn.abs() > PLANE_EPSILON {
                let sign = turn.signum();
                match initial_sign {
                    None => initial_sign = Some(sign),
                    Some(s) if s != sign => return false,
                    Some(_) => {}
                }
            }
        }
        true
    }

    /// Whether this polygon faces away from `eye` (normal pointing away from it).
    #[inline]
    pub fn is_back_facing(&self, eye: &Point3<f64>) -> bool {
        self.normal().dot(&(self.vertices[0] - eye)) >= 0.0
    }
}
