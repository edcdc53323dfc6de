//! Procedural primitives.
//!
//! Every primitive is unit sized with its base on the `y = 0` plane and
//! outward-facing counter-clockwise polygons. Parameterless shapes are built
//! once and shared from a process-wide cache.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use nalgebra::Point3;

use super::{Mesh, Polygon};
use crate::error::MeshError;

const RADIUS: f64 = 0.5;
const HEIGHT: f64 = 1.0;

/// Sides used for the cached cone and cylinder.
const ROUND_SIDES: usize = 16;
/// Quarter of the meridian count of the cached sphere.
const SPHERE_QUARTER: usize = 4;

/// A procedural mesh a node can reference instead of a named mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Square,
    Cube,
    Pyramid,
    Cone,
    Cylinder,
    Sphere,
    RegularPolygon { sides: usize },
}

impl Shape {
    /// Shapes resolved from the cache.
    const CACHED: [Shape; 6] = [
        Shape::Square,
        Shape::Cube,
        Shape::Pyramid,
        Shape::Cone,
        Shape::Cylinder,
        Shape::Sphere,
    ];

    /// Name used in scene documents.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Square => "square",
            Shape::Cube => "cube",
            Shape::Pyramid => "pyramid",
            Shape::Cone => "cone",
            Shape::Cylinder => "cylinder",
            Shape::Sphere => "sphere",
            Shape::RegularPolygon { .. } => "regularPolygon",
        }
    }

    /// Resolves a parameterless shape by its document name.
    pub fn from_name(name: &str) -> Option<Shape> {
        Self::CACHED.into_iter().find(|s| s.name() == name)
    }

    /// Returns the mesh for this shape.
    ///
    /// Parameterless shapes come from the cache; a regular polygon is
    /// generated on each call.
    pub fn mesh(&self) -> Result<Arc<Mesh>, MeshError> {
        match self {
            Shape::RegularPolygon { sides } => regular_polygon(*sides).map(Arc::new),
            shape => match SHAPE_CACHE.get(shape) {
                Some(cached) => cached.clone(),
                None => generate(shape).map(Arc::new),
            },
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::RegularPolygon { sides } => write!(f, "{}({})", self.name(), sides),
            shape => f.write_str(shape.name()),
        }
    }
}

lazy_static! {
    static ref SHAPE_CACHE: HashMap<Shape, Result<Arc<Mesh>, MeshError>> = Shape::CACHED
        .iter()
        .map(|shape| (*shape, generate(shape).map(Arc::new)))
        .collect();
}

fn generate(shape: &Shape) -> Result<Mesh, MeshError> {
    match shape {
        Shape::Square => square(),
        Shape::Cube => cube(),
        Shape::Pyramid => pyramid(),
        Shape::Cone => cone(ROUND_SIDES),
        Shape::Cylinder => cylinder(ROUND_SIDES),
        Shape::Sphere => sphere(SPHERE_QUARTER),
        Shape::RegularPolygon { sides } => regular_polygon(*sides),
    }
}

fn polygons(faces: &[&[usize]]) -> Vec<Polygon> {
    faces.iter().map(|f| Polygon::new(f.to_vec())).collect()
}

/// The four corners of the unit square on `y = 0`.
fn base_corners() -> Vec<Point3<f64>> {
    vec![
        Point3::new(-0.5, 0.0, -0.5),
        Point3::new(-0.5, 0.0, 0.5),
        Point3::new(0.5, 0.0, 0.5),
        Point3::new(0.5, 0.0, -0.5),
    ]
}

/// Unit square on `y = 0` facing up.
pub fn square() -> Result<Mesh, MeshError> {
    Mesh::new("native:square", base_corners(), polygons(&[&[0, 1, 2, 3]]))
}

/// Unit cube standing on `y = 0`.
pub fn cube() -> Result<Mesh, MeshError> {
    let mut vertices = base_corners();
    vertices.extend(base_corners().iter().map(|v| Point3::new(v.x, HEIGHT, v.z)));

    Mesh::new(
        "native:cube",
        vertices,
        polygons(&[
            &[3, 2, 1, 0],
            &[4, 5, 6, 7],
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[0, 4, 7, 3],
        ]),
    )
}

/// Square-based pyramid with its apex at `(0, 1, 0)`.
pub fn pyramid() -> Result<Mesh, MeshError> {
    let mut vertices = base_corners();
    vertices.push(Point3::new(0.0, HEIGHT, 0.0));

    Mesh::new(
        "native:pyramid",
        vertices,
        polygons(&[&[0, 3, 2, 1], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4], &[0, 1, 4]]),
    )
}

fn check_sides(shape: &'static str, sides: usize, min: usize) -> Result<(), MeshError> {
    if sides < min {
        return Err(MeshError::InvalidShapeParameter {
            shape,
            message: format!("{} sides requested, at least {} required", sides, min),
        });
    }
    Ok(())
}

/// Point on the circle of radius `radius` at height `y`, `step` of `sides`.
fn rim(radius: f64, y: f64, step: usize, sides: usize) -> Point3<f64> {
    let angle = step as f64 * 2.0 * PI / sides as f64;
    Point3::new(radius * angle.cos(), y, radius * angle.sin())
}

/// Cone with an `sides`-gon base and its apex at `(0, 1, 0)`.
pub fn cone(sides: usize) -> Result<Mesh, MeshError> {
    check_sides("cone", sides, 4)?;

    let mut vertices: Vec<_> = (0..sides).map(|i| rim(RADIUS, 0.0, i, sides)).collect();
    vertices.push(Point3::new(0.0, HEIGHT, 0.0));

    let mut faces = vec![Polygon::new((0..sides).collect())];
    faces.extend((0..sides).map(|i| Polygon::new(vec![i, sides, (i + 1) % sides])));

    Mesh::new("native:cone", vertices, faces)
}

/// Cylinder approximated by a prism over an `sides`-gon.
///
/// Vertices alternate bottom and top: `2i` is on `y = 0`, `2i + 1` above it.
pub fn cylinder(sides: usize) -> Result<Mesh, MeshError> {
    check_sides("cylinder", sides, 4)?;

    let vertices: Vec<_> = (0..sides)
        .flat_map(|i| [rim(RADIUS, 0.0, i, sides), rim(RADIUS, HEIGHT, i, sides)])
        .collect();

    let count = 2 * sides;
    let mut faces = Vec::with_capacity(sides + 2);
    faces.push(Polygon::new((0..sides).map(|i| 2 * i).collect()));
    faces.push(Polygon::new((0..sides).map(|i| 2 * (sides - i) - 1).collect()));
    faces.extend((0..sides).map(|i| {
        let v0 = 2 * i;
        Polygon::new(vec![v0, v0 + 1, (v0 + 3) % count, (v0 + 2) % count])
    }));

    Mesh::new("native:cylinder", vertices, faces)
}

/// Latitude-banded sphere of diameter 1 resting on `y = 0`.
///
/// `quarter` is a quarter of the meridian count `n`; the mesh has
/// `n²/2 - n + 2` vertices: two poles and `2 * quarter - 1` rings of `n`.
pub fn sphere(quarter: usize) -> Result<Mesh, MeshError> {
    check_sides("sphere", quarter, 1)?;

    let n = 4 * quarter;
    let step = 2.0 * PI / n as f64;
    let mut vertices = Vec::with_capacity(n * n / 2 - n + 2);
    let mut faces = Vec::with_capacity(n * n / 2);

    vertices.push(Point3::new(0.0, 2.0 * RADIUS, 0.0));

    // rings from the upper latitudes down, k in (quarter - 1)..=-(quarter - 1)
    let top = quarter as isize - 1;
    for k in (-top..=top).rev() {
        let latitude = k as f64 * step;
        let (h, r) = (RADIUS * latitude.sin(), RADIUS * latitude.cos());
        let ring = vertices.len();
        vertices.extend((0..n).map(|i| rim(r, h + RADIUS, i, n)));

        if k == top {
            faces.extend((0..n).map(|i| Polygon::new(vec![0, 1 + (i + 1) % n, 1 + i])));
        } else {
            let above = ring - n;
            faces.extend((0..n).map(|i| {
                let next = (i + 1) % n;
                Polygon::new(vec![above + i, above + next, ring + next, ring + i])
            }));
        }
    }

    vertices.push(Point3::origin());
    let len = vertices.len();
    faces.extend(
        (0..n).map(|i| Polygon::new(vec![len - 1, len - (2 + (i + 1) % n), len - (2 + i)])),
    );

    Mesh::new("native:sphere", vertices, faces)
}

/// Regular polygon with unit side length on `y = 0`, facing up.
pub fn regular_polygon(sides: usize) -> Result<Mesh, MeshError> {
    check_sides("regularPolygon", sides, 3)?;

    let n = sides as f64;
    let start = PI * (1.0 / n - 0.5);
    let step = -2.0 * PI / n;
    let radius = 0.5 / (PI / n).sin();

    let vertices = (0..sides)
        .map(|i| {
            let angle = start + step * i as f64;
            Point3::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect();

    Mesh::new("native:regularPolygon", vertices, vec![Polygon::new((0..sides).collect())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polyface;
    use crate::Color;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn counts(mesh: &Mesh) -> (usize, usize) {
        (mesh.vertices().len(), mesh.polygons().len())
    }

    fn faces(mesh: &Mesh) -> Vec<Polyface> {
        mesh.polygons()
            .iter()
            .map(|p| Polyface::new(Color::WHITE, mesh.polygon_vertices(p).collect()))
            .collect()
    }

    /// Every face normal points away from the solid's center.
    fn assert_outward(mesh: &Mesh, center: Point3<f64>) {
        for face in faces(mesh) {
            let outward = face.centroid() - center;
            assert!(
                face.normal().dot(&outward) > 0.0,
                "inward face in {}: {:?}",
                mesh.id(),
                face.vertices()
            );
        }
    }

    #[test]
    fn primitive_counts() {
        assert_eq!(counts(&square().unwrap()), (4, 1));
        assert_eq!(counts(&cube().unwrap()), (8, 6));
        assert_eq!(counts(&pyramid().unwrap()), (5, 5));
        assert_eq!(counts(&cone(16).unwrap()), (17, 17));
        assert_eq!(counts(&cylinder(16).unwrap()), (32, 18));
        assert_eq!(counts(&sphere(4).unwrap()), (16 * 16 / 2 - 16 + 2, 16 * 16 / 2));
        assert_eq!(counts(&sphere(1).unwrap()), (6, 8));
        assert_eq!(counts(&regular_polygon(7).unwrap()), (7, 1));
    }

    #[test]
    fn closed_primitives_are_manifold_and_outward() {
        let center = Point3::new(0.0, 0.5, 0.0);
        for mesh in [cube(), pyramid(), cone(8), cylinder(8), sphere(2)] {
            let mesh = mesh.unwrap();
            assert!(mesh.check_winding(), "{}", mesh.id());
            assert!(mesh.check_manifold(), "{}", mesh.id());
            assert_eq!(mesh.unconnected_parts(), 0, "{}", mesh.id());
        }
        for mesh in [cube(), cylinder(8), sphere(2)] {
            assert_outward(&mesh.unwrap(), center);
        }
    }

    #[test]
    fn flat_primitives_face_up() {
        for mesh in [square().unwrap(), regular_polygon(3).unwrap(), regular_polygon(9).unwrap()] {
            let faces = faces(&mesh);
            assert_relative_eq!(faces[0].normal(), Vector3::y(), epsilon = 1e-12);
            assert!(!mesh.check_manifold());
        }
    }

    #[test]
    fn regular_polygon_has_unit_sides() {
        let mesh = regular_polygon(6).unwrap();
        let polygon = &mesh.polygons()[0];
        for (from, to) in polygon.edges() {
            assert_relative_eq!((mesh.vertices()[to] - mesh.vertices()[from]).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sphere_spans_unit_height() {
        let mesh = sphere(4).unwrap();
        let (min, max) = mesh
            .vertices()
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));
        assert_relative_eq!(min, 0.0);
        assert_relative_eq!(max, 1.0);
        for v in mesh.vertices() {
            assert_relative_eq!((v - Point3::new(0.0, 0.5, 0.0)).norm(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(cone(3), Err(MeshError::InvalidShapeParameter { shape: "cone", .. })));
        assert!(matches!(cylinder(2), Err(MeshError::InvalidShapeParameter { .. })));
        assert!(matches!(sphere(0), Err(MeshError::InvalidShapeParameter { .. })));
        assert!(matches!(
            Shape::RegularPolygon { sides: 2 }.mesh(),
            Err(MeshError::InvalidShapeParameter { shape: "regularPolygon", .. })
        ));
    }

    #[test]
    fn cached_shapes_are_shared() {
        let a = Shape::Sphere.mesh().unwrap();
        let b = Shape::Sphere.mesh().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id(), "native:sphere");
        assert_eq!(a.vertices().len(), 114);

        let cone = Shape::Cone.mesh().unwrap();
        assert_eq!(cone.polygons().len(), ROUND_SIDES + 1);
    }

    #[test]
    fn names() {
        for shape in Shape::CACHED {
            assert_eq!(Shape::from_name(shape.name()), Some(shape));
        }
        assert_eq!(Shape::from_name("regularPolygon"), None);
        assert_eq!(Shape::RegularPolygon { sides: 5 }.to_string(), "regularPolygon(5)");
    }
}
