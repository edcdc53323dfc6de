//! Local-space polygon meshes.
//!
//! A [`Mesh`] is purely geometric: a vertex array plus polygons given as
//! index lists into it. Meshes are validated once at construction and are
//! immutable afterwards, so scene nodes share them through `Arc`.

mod diagnostics;
mod shapes;

pub use shapes::{cone, cube, cylinder, pyramid, regular_polygon, sphere, square, Shape};

use nalgebra::Point3;

use crate::error::MeshError;
use crate::transform::normalize_or_zero;

/// Tolerance of the construction checks, on squared lengths and on the
/// unnormalized plane equation.
const SANITY_EPSILON: f64 = 1e-5;

/// A face of a [`Mesh`]: vertex indices plus an optional per-face color index.
///
/// The color index selects an entry of the owning node's color list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    indices: Vec<usize>,
    color_index: Option<usize>,
}

impl Polygon {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            color_index: None,
        }
    }

    pub fn with_color_index(mut self, color_index: usize) -> Self {
        self.color_index = Some(color_index);
        self
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn color_index(&self) -> Option<usize> {
        self.color_index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Directed edges `(from, to)`, closing the loop from the last index.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let last = self.indices.last().copied();
        last.into_iter()
            .chain(self.indices.iter().copied())
            .zip(self.indices.iter().copied())
    }
}

/// A named collection of polygons over a shared vertex array.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: String,
    vertices: Vec<Point3<f64>>,
    polygons: Vec<Polygon>,
}

impl Mesh {
    /// Creates a mesh, checking every polygon.
    ///
    /// Each polygon needs at least three in-range indices, distinct
    /// consecutive vertices, one non-collinear consecutive triple, and all of
    /// its vertices on the plane of that triple.
    pub fn new(
        id: impl Into<String>,
        vertices: Vec<Point3<f64>>,
        polygons: Vec<Polygon>,
    ) -> Result<Self, MeshError> {
        let mesh = Self {
            id: id.into(),
            vertices,
            polygons,
        };
        mesh.sanity_check()?;
        Ok(mesh)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// The local-space positions of a polygon's vertices, in order.
    pub fn polygon_vertices<'a>(
        &'a self,
        polygon: &'a Polygon,
    ) -> impl Iterator<Item = Point3<f64>> + 'a {
        polygon.indices.iter().map(|&i| self.vertices[i])
    }

    /// Extrudes the single polygon of `source` along its normal.
    ///
    /// The result is a closed solid: the polygon displaced by `distance` as a
    /// cap, one quad per edge as walls, and the flipped polygon as base. The
    /// source polygon's color index is carried to every face.
    pub fn extrude(id: impl Into<String>, source: &Mesh, distance: f64) -> Result<Mesh, MeshError> {
        let polygon = match source.polygons.as_slice() {
            [polygon] => polygon,
            polygons => {
                return Err(MeshError::ExtrudeSource {
                    mesh: source.id.clone(),
                    count: polygons.len(),
                });
            }
        };

        let n_vertices = source.vertices.len();
        let idx = &polygon.indices;
        let (p0, p1, p2) = (
            source.vertices[idx[0]],
            source.vertices[idx[1]],
            source.vertices[idx[2]],
        );
        let offset = normalize_or_zero((p1 - p0).cross(&(p2 - p1))) * distance;

        let mut vertices = source.vertices.clone();
        vertices.extend(source.vertices.iter().map(|v| v + offset));

        let tag = |p: Polygon| match polygon.color_index {
            Some(c) => p.with_color_index(c),
            None => p,
        };

        let cap: Vec<usize> = idx.iter().map(|i| i + n_vertices).collect();
        let n = idx.len();

        let mut polygons = Vec::with_capacity(n + 2);
        polygons.push(tag(Polygon::new(cap.clone())));
        for i in 0..n {
            let next = (i + 1) % n;
            polygons.push(tag(Polygon::new(vec![idx[i], idx[next], cap[next], cap[i]])));
        }
        polygons.push(tag(Polygon::new(idx.iter().rev().copied().collect())));

        Mesh::new(id, vertices, polygons)
    }

    fn sanity_check(&self) -> Result<(), MeshError> {
        for polygon in &self.polygons {
            self.check_polygon(polygon)?;
        }
        Ok(())
    }

    fn check_polygon(&self, polygon: &Polygon) -> Result<(), MeshError> {
        let idx = &polygon.indices;
        let n = idx.len();
        if n < 3 {
            return Err(MeshError::TooFewVertices {
                mesh: self.id.clone(),
                count: n,
            });
        }
        if let Some(&index) = idx.iter().find(|&&i| i >= self.vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                mesh: self.id.clone(),
                index,
                len: self.vertices.len(),
            });
        }

        for (from, to) in polygon.edges() {
            if (self.vertices[from] - self.vertices[to]).norm_squared() < SANITY_EPSILON {
                return Err(MeshError::DegenerateEdge { mesh: self.id.clone() });
            }
        }

        let reference = (0..n).find_map(|i| {
            let p0 = self.vertices[idx[i]];
            let p1 = self.vertices[idx[(i + 1) % n]];
            let p2 = self.vertices[idx[(i + 2) % n]];
            let normal = (p1 - p0).cross(&(p2 - p1));
            (normal.norm_squared() > SANITY_EPSILON).then_some((p0, normal))
        });
        let (pivot, normal) = reference.ok_or_else(|| MeshError::Collinear { mesh: self.id.clone() })?;

        let planar = idx
            .iter()
            .all(|&i| (pivot - self.vertices[i]).dot(&normal).abs() <= SANITY_EPSILON);
        if !planar {
            return Err(MeshError::NonPlanar { mesh: self.id.clone() });
        }
        Ok(())
    }
}
