//! Error types for mesh construction, scene management and persistence.

use thiserror::Error;

/// Fatal errors raised while constructing a [`Mesh`](crate::Mesh).
///
/// A mesh is never partially valid: construction either succeeds with every
/// polygon checked, or fails with the first offending polygon.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A polygon references fewer than three vertices.
    #[error("polygon with only {count} vertices found in mesh {mesh}")]
    TooFewVertices { mesh: String, count: usize },

    /// A polygon references a vertex index past the end of the vertex array.
    #[error("polygon with vertex index {index} out of range (vertex count {len}) in mesh {mesh}")]
    IndexOutOfRange {
        mesh: String,
        index: usize,
        len: usize,
    },

    /// Two consecutive vertices of a polygon coincide.
    #[error("polygon with too near consecutive vertices found in mesh {mesh}")]
    DegenerateEdge { mesh: String },

    /// Every consecutive vertex triple of a polygon is collinear.
    #[error("degenerate polygon with only collinear vertices found in mesh {mesh}")]
    Collinear { mesh: String },

    /// A polygon's vertices do not share a plane.
    #[error("non planar polygon found in mesh {mesh}")]
    NonPlanar { mesh: String },

    /// A procedural shape was requested with an unusable parameter.
    #[error("invalid parameter for shape {shape}: {message}")]
    InvalidShapeParameter {
        shape: &'static str,
        message: String,
    },

    /// Extrusion needs a source mesh with exactly one polygon.
    #[error("extrusion source mesh {mesh} has {count} polygons, exactly one required")]
    ExtrudeSource { mesh: String, count: usize },
}

/// Errors raised by the [`Engine`](crate::Engine) scene container.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("mesh id {0} already registered")]
    DuplicateMesh(String),

    #[error("node {node} references unknown mesh id {mesh}")]
    UnknownMesh { node: String, mesh: String },

    #[error("scene not set up, call setup_scene before rendering")]
    NotSetUp,

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors raised while loading entities from a structured value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistError {
    #[error("missing element '{0}'")]
    MissingField(&'static str),

    #[error("invalid element '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("unknown shape '{0}'")]
    UnknownShape(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
