//! Polygon cutting/splitting operations for BSP trees.

use crate::{Classification, Plane3D, Polyface, PLANE_EPSILON};

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable: Sized {
    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)` where:
    /// - `front`: `Some(polygon)` containing the part on the front side of the plane
    /// - `back`: `Some(polygon)` containing the part on the back side of the plane
    ///
    /// # Return values by classification
    ///
    /// - **Front**: `(Some(self), None)` - entire geometry is in front
    /// - **Back**: `(None, Some(self))` - entire geometry is behind
    /// - **Coplanar**: `(Some(self), None)` - treated as front
    /// - **Spanning**: `(front_part, back_part)` - each side kept only if it
    ///   still has at least three vertices
    fn cut(&self, plane: &Plane3D) -> (Option<Self>, Option<Self>);
}

impl Cuttable for Polyface {
    fn cut(&self, plane: &Plane3D) -> (Option<Polyface>, Option<Polyface>) {
        match self.classify(plane) {
            Classification::Front | Classification::Coplanar => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => self.split(plane),
        }
    }
}

impl Polyface {
    /// Splits this polygon into its front and back parts.
    ///
    /// Sutherland-Hodgman with two outputs: every vertex within tolerance of
    /// the plane lands in both lists, and each edge that strictly crosses the
    /// plane contributes its intersection point to both lists.
    pub fn split(&self, plane: &Plane3D) -> (Option<Polyface>, Option<Polyface>) {
        let vertices = self.vertices();
        let n = vertices.len();

        let mut front_verts = Vec::with_capacity(n + 1);
        let mut back_verts = Vec::with_capacity(n + 1);

        let distances: Vec<f64> = vertices.iter().map(|v| plane.signed_distance(v)).collect();

        for i in 0..n {
            let next = (i + 1) % n;
            let (d1, d2) = (distances[i], distances[next]);

            if d1 >= -PLANE_EPSILON {
                front_verts.push(vertices[i]);
            }
            if d1 <= PLANE_EPSILON {
                back_verts.push(vertices[i]);
            }

            let crosses = (d1 > PLANE_EPSILON && d2 < -PLANE_EPSILON)
                || (d1 < -PLANE_EPSILON && d2 > PLANE_EPSILON);
            if crosses {
                if let Some(intersection) = plane.intersect_segment(&vertices[i], &vertices[next]) {
                    front_verts.push(intersection);
                    back_verts.push(intersection);
                }
            }
        }

        let front = (front_verts.len() >= 3).then(|| Polyface::new(self.color(), front_verts));
        let back = (back_verts.len() >= 3).then(|| Polyface::new(self.color(), back_verts));

        (front, back)
    }
}
