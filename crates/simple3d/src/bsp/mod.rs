//! Binary Space Partitioning tree for painter's-algorithm ordering.
//!
//! This module recursively partitions a static set of world-space
//! [`Polyface`](crate::Polyface)s using the planes of the polygons themselves.
//! The resulting tree yields, for any viewpoint, an order in which later
//! polygons may overpaint earlier ones without a depth buffer.
//!
//! # Example
//!
//! ```
//! use simple3d::{BspTree, CollectingVisitor, Color, Polyface};
//! use nalgebra::Point3;
//!
//! let near = Polyface::new(Color::RED, vec![
//!     Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0), Point3::new(0.0, 1.0, 1.0),
//! ]);
//! let far = Polyface::new(Color::BLUE, vec![
//!     Point3::new(0.0, 0.0, -1.0), Point3::new(1.0, 0.0, -1.0), Point3::new(0.0, 1.0, -1.0),
//! ]);
//! let tree = BspTree::from_polygons(vec![near, far]);
//!
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_back_to_front(Point3::new(0.0, 0.0, 10.0), &mut visitor);
//! let order: Vec<_> = visitor.ids().iter().map(|&id| tree.face(id).color()).collect();
//! assert_eq!(order, vec![Color::BLUE, Color::RED]);
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: owns the polygon arena and the root node
//! - [`BspNode`]: one splitter polygon (by [`FaceId`]) and two optional subtrees
//! - [`PlaneSelector`]: strategy for choosing the splitter ([`CostHeuristic`] by default)
//! - [`BspVisitor`]: receives polygons during traversal

mod node;
mod selector;
mod tree;
mod visitor;

pub use node::{faces_same_direction, BspNode, FaceId};
pub use selector::{CostHeuristic, FirstPolygon, PlaneSelector};
pub use tree::BspTree;
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
