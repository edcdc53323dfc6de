//! A small software 3D engine built around a BSP (Binary Space Partitioning)
//! tree.
//!
//! Scenes are made of [`Node`]s instancing polygon [`Mesh`]es. At setup every
//! face is placed in world space and the faces are partitioned into a
//! [`BspTree`], which yields a correct back-to-front painting order from any
//! camera position. Each frame is then culled, flat shaded by a single
//! [`Light`], clipped against the near plane and projected to screen
//! polygons, ready for any polygon filler.

mod clip;
mod color;
mod cuttable;
mod engine;
mod error;
mod info;
mod light;
mod node;
mod persist;
mod plane;
mod polyface;
mod transform;

pub mod bsp;
pub mod mesh;

pub use bsp::{BspTree, BspVisitor, CollectingVisitor, CostHeuristic, FaceId, FirstPolygon, FnVisitor, PlaneSelector};
pub use clip::{clip_against_near_plane, intersect_near_plane, to_screen, Z_NEAR};
pub use color::Color;
pub use cuttable::Cuttable;
pub use engine::{Direction, Engine, Frame, ScreenPolygon};
pub use error::{MeshError, PersistError, SceneError};
pub use info::SceneInfo;
pub use light::{Light, AMBIENT};
pub use mesh::{Mesh, Polygon, Shape};
pub use node::{MeshSource, Node};
pub use persist::{Persist, WORLD_FORMAT};
pub use plane::{Classification, Plane3D, PlaneSide, PLANE_EPSILON};
pub use polyface::Polyface;
pub use transform::Transform;
