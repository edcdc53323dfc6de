//! Scene nodes: placed, colored instances of a mesh.

use std::fmt;

use crate::mesh::{Mesh, Polygon, Shape};
use crate::{Color, Polyface, Transform};

/// Where a node takes its geometry from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    /// A mesh registered with the engine under this id.
    Mesh(String),
    /// A procedural primitive.
    Shape(Shape),
}

impl fmt::Display for MeshSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshSource::Mesh(id) => f.write_str(id),
            MeshSource::Shape(shape) => write!(f, "{}", shape),
        }
    }
}

/// An instance of a mesh in the world.
///
/// The world transform starts as identity and is built up with the `apply_*`
/// methods, which compose in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    source: MeshSource,
    color: Option<Color>,
    color_list: Option<Vec<Color>>,
    world: Transform,
}

impl Node {
    pub fn new(id: impl Into<String>, source: MeshSource, color: Option<Color>) -> Self {
        Self {
            id: id.into(),
            source,
            color,
            color_list: None,
            world: Transform::identity(),
        }
    }

    /// A node instancing the engine mesh `mesh_id`.
    pub fn with_mesh(id: impl Into<String>, mesh_id: impl Into<String>, color: Color) -> Self {
        Self::new(id, MeshSource::Mesh(mesh_id.into()), Some(color))
    }

    /// A node instancing a procedural shape.
    pub fn with_shape(id: impl Into<String>, shape: Shape, color: Color) -> Self {
        Self::new(id, MeshSource::Shape(shape), Some(color))
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    #[inline]
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    #[inline]
    pub fn color_list(&self) -> Option<&[Color]> {
        self.color_list.as_deref()
    }

    pub fn set_color_list(&mut self, colors: Vec<Color>) {
        self.color_list = Some(colors);
    }

    #[inline]
    pub fn world(&self) -> &Transform {
        &self.world
    }

    pub fn set_world(&mut self, world: Transform) {
        self.world = world;
    }

    pub fn apply_translation(&mut self, x: f64, y: f64, z: f64) {
        self.world.apply_translation(x, y, z);
    }

    pub fn apply_scale(&mut self, sx: f64, sy: f64, sz: f64) {
        self.world.apply_scale(sx, sy, sz);
    }

    pub fn apply_rotation_x(&mut self, angle: f64) {
        self.world.apply_rotation_x(angle);
    }

    pub fn apply_rotation_y(&mut self, angle: f64) {
        self.world.apply_rotation_y(angle);
    }

    pub fn apply_rotation_z(&mut self, angle: f64) {
        self.world.apply_rotation_z(angle);
    }

    /// Color of one of this node's faces.
    ///
    /// A face without a color index takes the node color; an indexed face
    /// takes the matching entry of the color list. Anything unresolved is
    /// gray.
    pub fn face_color(&self, polygon: &Polygon) -> Color {
        let color = match polygon.color_index() {
            None => self.color,
            Some(i) => self.color_list.as_ref().and_then(|list| list.get(i).copied()),
        };
        color.unwrap_or(Color::GRAY)
    }

    /// The faces of `mesh` placed in world space, one per polygon.
    pub fn polyfaces<'a>(&'a self, mesh: &'a Mesh) -> impl Iterator<Item = Polyface> + 'a {
        mesh.polygons().iter().map(move |polygon| {
            let vertices = mesh
                .polygon_vertices(polygon)
                .map(|v| self.world.transform_point(&v))
                .collect();
            Polyface::new(self.face_color(polygon), vertices)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn face_color_resolution() {
        let mut node = Node::with_mesh("n", "m", Color::RED);
        let plain = Polygon::new(vec![0, 1, 2]);
        let indexed = Polygon::new(vec![0, 1, 2]).with_color_index(1);

        assert_eq!(node.face_color(&plain), Color::RED);
        // no color list yet
        assert_eq!(node.face_color(&indexed), Color::GRAY);

        node.set_color_list(vec![Color::BLUE]);
        // index past the end of the list
        assert_eq!(node.face_color(&indexed), Color::GRAY);

        node.set_color_list(vec![Color::BLUE, Color::GREEN]);
        assert_eq!(node.face_color(&indexed), Color::GREEN);

        let colorless = Node::new("c", MeshSource::Shape(Shape::Cube), None);
        assert_eq!(colorless.face_color(&plain), Color::GRAY);
    }

    #[test]
    fn transforms_apply_in_call_order() {
        let mut node = Node::with_shape("n", Shape::Square, Color::WHITE);
        node.apply_scale(2.0, 2.0, 2.0);
        node.apply_translation(1.0, 0.0, 0.0);

        // scaled first, then moved
        let p = node.world().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn polyfaces_are_in_world_space() {
        let mesh = Shape::Square.mesh().unwrap();
        let mut node = Node::with_shape("floor", Shape::Square, Color::ORANGE);
        node.apply_rotation_x(FRAC_PI_2);
        node.apply_translation(0.0, 0.0, 5.0);

        let faces: Vec<_> = node.polyfaces(&mesh).collect();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].color(), Color::ORANGE);
        for v in faces[0].vertices() {
            assert_relative_eq!(v.z, 5.0, epsilon = 1e-12);
        }
        // the up-facing square now faces along the z axis
        assert_relative_eq!(faces[0].normal().abs(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn source_display() {
        assert_eq!(MeshSource::Mesh("mycube".into()).to_string(), "mycube");
        assert_eq!(MeshSource::Shape(Shape::Cone).to_string(), "cone");
    }
}
