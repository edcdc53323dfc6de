//! BSP tree node implementation.

use crate::{Plane3D, Polyface};

/// Index of a polygon in a [`BspTree`](super::BspTree)'s arena.
///
/// Two polyfaces with identical geometry still have distinct ids, which is
/// what lets the builder skip "the splitter itself" without comparing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub(crate) usize);

impl FaceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the BSP tree.
///
/// Each node partitions space with the plane of its splitter polygon.
/// Polygons in front of that plane (and coplanar ones facing the same way)
/// live in the front subtree, the rest in the back subtree.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// The polygon whose plane splits this node.
    splitter: FaceId,

    /// Subtree containing polygons in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree containing polygons BEHIND the splitting plane.
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates a leaf node for the given splitter.
    pub fn new(splitter: FaceId) -> Self {
        Self {
            splitter,
            front: None,
            back: None,
        }
    }

    #[inline]
    pub fn splitter(&self) -> FaceId {
        self.splitter
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    #[inline]
    pub fn set_front(&mut self, node: Option<BspNode>) {
        self.front = node.map(Box::new);
    }

    #[inline]
    pub fn set_back(&mut self, node: Option<BspNode>) {
        self.back = node.map(Box::new);
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Number of nodes (and therefore polygons) in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.front.as_ref().map_or(0, |n| n.node_count())
            + self.back.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let back_depth = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(back_depth)
    }
}

/// Determines if a polygon faces the same direction as a plane.
///
/// Returns `true` if the normals point in roughly the same direction
/// (dot > 0). Degenerate polygons (zero normal) never do.
#[inline]
pub fn faces_same_direction(polygon: &Polyface, plane: &Plane3D) -> bool {
    polygon.normal().dot(&plane.normal()) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use nalgebra::{Point3, Vector3};

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Polyface {
        Polyface::new(
            Color::WHITE,
            vec![
                Point3::new(a[0], a[1], a[2]),
                Point3::new(b[0], b[1], b[2]),
                Point3::new(c[0], c[1], c[2]),
            ],
        )
    }

    #[test]
    fn new_node_is_leaf() {
        let node = BspNode::new(FaceId(0));
        assert!(node.is_leaf());
        assert_eq!(node.node_count(), 1);
        assert_eq!(node.depth(), 1);
        assert_eq!(node.splitter().index(), 0);
    }

    #[test]
    fn set_children_updates_leaf_status() {
        let mut node = BspNode::new(FaceId(0));

        node.set_front(Some(BspNode::new(FaceId(1))));
        assert!(!node.is_leaf());

        node.set_front(None);
        assert!(node.is_leaf());

        node.set_back(Some(BspNode::new(FaceId(2))));
        assert!(!node.is_leaf());
        assert_eq!(node.back().map(|n| n.splitter()), Some(FaceId(2)));
    }

    #[test]
    fn depth_and_count() {
        let mut root = BspNode::new(FaceId(0));
        let mut front = BspNode::new(FaceId(1));
        front.set_front(Some(BspNode::new(FaceId(2))));
        root.set_front(Some(front));
        assert_eq!(root.depth(), 3);

        root.set_back(Some(BspNode::new(FaceId(3))));
        assert_eq!(root.depth(), 3);
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn faces_same_direction_by_winding() {
        let plane = Plane3D::from_point_and_normal(Point3::origin(), Vector3::y());

        // (1,0,0) x (0,0,1) = (0,-1,0)
        let down = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(!faces_same_direction(&down, &plane));

        let up = make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        assert!(faces_same_direction(&up, &plane));
    }
}
