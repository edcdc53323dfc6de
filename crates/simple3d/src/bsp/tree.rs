//! BSP tree container, construction and traversal.

use nalgebra::Point3;

use crate::{Classification, Polyface};

use super::node::{faces_same_direction, BspNode, FaceId};
use super::selector::{CostHeuristic, PlaneSelector};
use super::visitor::{BspVisitor, CollectingVisitor};

/// A Binary Space Partitioning tree over world-space polygons.
///
/// The tree owns every polygon in an arena; nodes refer to their splitter by
/// [`FaceId`]. Polygons that span a splitting plane are replaced by their
/// split parts, which are appended to the arena, so the arena may hold more
/// entries than the tree has nodes.
///
/// The tree is built once for a static scene. There is no incremental
/// update: changed geometry requires a rebuild.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    faces: Vec<Polyface>,
    root: Option<BspNode>,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a BSP tree from a collection of polygons.
    ///
    /// Uses the provided [`PlaneSelector`] to choose a splitter at each level.
    /// Returns an empty tree if the input is empty.
    pub fn build<S: PlaneSelector>(polygons: Vec<Polyface>, selector: &S) -> Self {
        let ids = (0..polygons.len()).map(FaceId).collect();
        let mut faces = polygons;
        let root = build_node(&mut faces, ids, selector);
        Self { faces, root }
    }

    /// Builds a BSP tree using the default [`CostHeuristic`].
    pub fn from_polygons(polygons: Vec<Polyface>) -> Self {
        Self::build(polygons, &CostHeuristic::default())
    }

    /// Returns `true` if the tree contains no polygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<&BspNode> {
        self.root.as_ref()
    }

    /// The polygon arena, including spanning polygons that were split.
    #[inline]
    pub fn faces(&self) -> &[Polyface] {
        &self.faces
    }

    /// Returns the polygon stored under `id`.
    ///
    /// # Panics
    /// Panics if `id` does not come from this tree.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Polyface {
        &self.faces[id.index()]
    }

    /// Number of polygons reachable from the root (one per node).
    pub fn polygon_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Traverses the tree back-to-front relative to the given viewpoint.
    ///
    /// This is the painter's-algorithm order: each visited polygon may
    /// overpaint the ones visited before it.
    pub fn traverse_back_to_front<V: BspVisitor>(&self, eye: Point3<f64>, visitor: &mut V) {
        if let Some(ref root) = self.root {
            self.back_to_front_node(root, &eye, visitor);
        }
    }

    /// Traverses the tree front-to-back relative to the given viewpoint.
    ///
    /// Exactly the reverse of [`BspTree::traverse_back_to_front`].
    pub fn traverse_front_to_back<V: BspVisitor>(&self, eye: Point3<f64>, visitor: &mut V) {
        if let Some(ref root) = self.root {
            self.front_to_back_node(root, &eye, visitor);
        }
    }

    /// Polygon ids in back-to-front order for the given viewpoint.
    pub fn draw_order(&self, eye: Point3<f64>) -> Vec<FaceId> {
        let mut visitor = CollectingVisitor::with_capacity(self.polygon_count());
        self.traverse_back_to_front(eye, &mut visitor);
        visitor.into_ids()
    }

    /// Collects all polygons in the tree, in no particular order.
    pub fn collect_polygons(&self) -> Vec<&Polyface> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.collect_recursive(self.root.as_ref(), &mut result);
        result
    }

    /// `true` when `eye` is strictly in front of the node's splitter plane.
    fn eye_in_front(&self, node: &BspNode, eye: &Point3<f64>) -> bool {
        self.face(node.splitter()).plane().signed_distance(eye) > 0.0
    }

    fn back_to_front_node<V: BspVisitor>(&self, node: &BspNode, eye: &Point3<f64>, visitor: &mut V) {
        let id = node.splitter();
        let (first, last) = if self.eye_in_front(node, eye) {
            // Eye is in front: back subtree is farther
            (node.back(), node.front())
        } else {
            (node.front(), node.back())
        };

        if let Some(first) = first {
            self.back_to_front_node(first, eye, visitor);
        }
        visitor.visit(id, self.face(id));
        if let Some(last) = last {
            self.back_to_front_node(last, eye, visitor);
        }
    }

    fn front_to_back_node<V: BspVisitor>(&self, node: &BspNode, eye: &Point3<f64>, visitor: &mut V) {
        let id = node.splitter();
        let (first, last) = if self.eye_in_front(node, eye) {
            // Eye is in front: front subtree is closer
            (node.front(), node.back())
        } else {
            (node.back(), node.front())
        };

        if let Some(first) = first {
            self.front_to_back_node(first, eye, visitor);
        }
        visitor.visit(id, self.face(id));
        if let Some(last) = last {
            self.front_to_back_node(last, eye, visitor);
        }
    }

    fn collect_recursive<'a>(&'a self, node: Option<&'a BspNode>, result: &mut Vec<&'a Polyface>) {
        if let Some(n) = node {
            result.push(self.face(n.splitter()));
            self.collect_recursive(n.front(), result);
            self.collect_recursive(n.back(), result);
        }
    }
}

/// Recursively builds a BSP node from the polygons in `ids`.
///
/// Split parts are appended to `faces`; their ids are fresh.
fn build_node<S: PlaneSelector>(
    faces: &mut Vec<Polyface>,
    ids: Vec<FaceId>,
    selector: &S,
) -> Option<BspNode> {
    let splitter = selector.select(faces, &ids)?;
    let plane = faces[splitter.index()].plane().clone();

    let mut front_list = Vec::new();
    let mut back_list = Vec::new();

    for id in ids {
        if id == splitter {
            continue;
        }
        let polygon = &faces[id.index()];
        match polygon.classify(&plane) {
            Classification::Front => front_list.push(id),
            Classification::Back => back_list.push(id),
            Classification::Coplanar => {
                // keep coplanar polygons in a stable bucket by facing
                if faces_same_direction(polygon, &plane) {
                    front_list.push(id);
                } else {
                    back_list.push(id);
                }
            }
            Classification::Spanning => {
                let (front_part, back_part) = polygon.split(&plane);
                if let Some(f) = front_part {
                    front_list.push(FaceId(faces.len()));
                    faces.push(f);
                }
                if let Some(b) = back_part {
                    back_list.push(FaceId(faces.len()));
                    faces.push(b);
                }
            }
        }
    }

    let mut node = BspNode::new(splitter);
    node.set_front(build_node(faces, front_list, selector));
    node.set_back(build_node(faces, back_list, selector));

    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::FirstPolygon;
    use crate::bsp::visitor::FnVisitor;
    use crate::Color;

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

    fn quad(color: Color, corners: [[f64; 3]; 4]) -> Polyface {
        Polyface::new(
            color,
            corners.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect(),
        )
    }

    /// Six outward-facing faces of an axis-aligned cube.
    fn cube(center: [f64; 3], half: f64) -> Vec<Polyface> {
        let [x, y, z] = center;
        let c = |dx: f64, dy: f64, dz: f64| [x + dx * half, y + dy * half, z + dz * half];
        vec![
            quad(Color::RED, [c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)]),
            quad(Color::RED, [c(1., -1., -1.), c(-1., -1., -1.), c(-1., 1., -1.), c(1., 1., -1.)]),
            quad(Color::RED, [c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)]),
            quad(Color::RED, [c(1., -1., 1.), c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.)]),
            quad(Color::RED, [c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.), c(-1., 1., -1.)]),
            quad(Color::RED, [c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)]),
        ]
    }

    #[test]
    fn empty_tree() {
        let tree = BspTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.polygon_count(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.draw_order(Point3::origin()).is_empty());
    }

    #[test]
    fn build_empty() {
        let tree = BspTree::from_polygons(vec![]);
        assert!(tree.is_empty());
    }

    #[test]
    fn build_single_polygon() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let tree = BspTree::from_polygons(vec![poly]);

        assert!(!tree.is_empty());
        assert_eq!(tree.polygon_count(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn coplanar_polygons_are_bucketed_by_facing() {
        let splitter = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let same = make_triangle([2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 1.0, 0.0]);
        let opposite = make_triangle([2.0, 0.0, 0.0], [2.0, 1.0, 0.0], [3.0, 0.0, 0.0]);

        let tree = BspTree::build(vec![splitter, same, opposite], &FirstPolygon);
        let root = tree.root().unwrap();

        assert_eq!(root.splitter(), FaceId(0));
        assert_eq!(root.front().map(|n| n.splitter()), Some(FaceId(1)));
        assert_eq!(root.back().map(|n| n.splitter()), Some(FaceId(2)));
    }

    #[test]
    fn build_spanning_polygon_gets_split() {
        // First polygon on Y=0 plane
        let splitter = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

        // Second polygon spans the Y=0 plane
        let spanning = make_triangle([-0.5, -1.0, 0.5], [0.5, 1.0, 0.5], [0.5, -1.0, 0.5]);

        let tree = BspTree::build(vec![splitter, spanning], &FirstPolygon);

        // The spanning triangle is replaced by its two parts
        assert_eq!(tree.polygon_count(), 3);
        assert_eq!(tree.faces().len(), 4);
    }

    #[test]
    fn back_to_front_lists_far_before_near() {
        let near = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let far = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);

        for polygons in [vec![far.clone(), near.clone()], vec![near.clone(), far.clone()]] {
            let tree = BspTree::from_polygons(polygons);
            let order = tree.draw_order(Point3::new(0.5, 0.5, 10.0));
            assert_eq!(order.len(), 2);

            let first_z = tree.face(order[0]).centroid().z;
            let second_z = tree.face(order[1]).centroid().z;
            assert!(
                first_z < second_z,
                "Expected back-to-front order: first_z={} should be < second_z={}",
                first_z,
                second_z
            );

            // Camera on the other side: the order flips
            let order = tree.draw_order(Point3::new(0.5, 0.5, -10.0));
            assert!(tree.face(order[0]).centroid().z > tree.face(order[1]).centroid().z);
        }
    }

    #[test]
    fn front_to_back_is_reverse_of_back_to_front() {
        let mut polygons = cube([0.0, 0.0, 0.0], 1.0);
        polygons.extend(cube([4.0, 1.0, -3.0], 0.5));
        let tree = BspTree::from_polygons(polygons);
        let eye = Point3::new(7.0, 2.5, 6.0);

        let mut back_to_front = tree.draw_order(eye);
        let mut front_to_back = Vec::new();
        tree.traverse_front_to_back(eye, &mut FnVisitor::new(|id, _: &Polyface| front_to_back.push(id)));

        back_to_front.reverse();
        assert_eq!(back_to_front, front_to_back);
    }

    #[test]
    fn traversal_is_a_permutation_without_splits() {
        let mut polygons = cube([0.0, 0.0, 0.0], 1.0);
        polygons.extend(cube([5.0, 0.0, 0.0], 1.0));
        let input = polygons.clone();

        let tree = BspTree::from_polygons(polygons);
        let order = tree.draw_order(Point3::new(2.5, 8.0, 9.0));

        assert_eq!(order.len(), input.len());
        // Separated cubes need no splits: every input polygon appears once
        let mut seen: Vec<usize> = order.iter().map(|id| id.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
        for id in order {
            assert_eq!(tree.face(id), &input[id.index()]);
        }
    }

    #[test]
    fn traversal_covers_split_parts() {
        // A large floor crossing a vertical wall must be split by it
        let wall = quad(
            Color::RED,
            [[0.0, -1.0, -1.0], [0.0, -1.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, -1.0]],
        );
        let floor = quad(
            Color::BLUE,
            [[-3.0, 0.0, -3.0], [-3.0, 0.0, 3.0], [3.0, 0.0, 3.0], [3.0, 0.0, -3.0]],
        );
        let tree = BspTree::build(vec![wall, floor], &FirstPolygon);
        let order = tree.draw_order(Point3::new(5.0, 5.0, 0.0));

        assert_eq!(order.len(), 3);
        let blue: Vec<_> = order
            .iter()
            .map(|&id| tree.face(id))
            .filter(|f| f.color() == Color::BLUE)
            .collect();
        assert_eq!(blue.len(), 2);
        // the floor halves together cover x in [-3, 3]
        let min_x = blue.iter().flat_map(|f| f.vertices()).map(|v| v.x).fold(f64::MAX, f64::min);
        let max_x = blue.iter().flat_map(|f| f.vertices()).map(|v| v.x).fold(f64::MIN, f64::max);
        assert_eq!((min_x, max_x), (-3.0, 3.0));
    }

    #[test]
    fn collect_polygons() {
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let poly3 = make_triangle([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]);

        let tree = BspTree::from_polygons(vec![poly1, poly2, poly3]);
        assert_eq!(tree.collect_polygons().len(), 3);
        // the middle slab balances the tree
        assert_eq!(tree.depth(), 2);
    }
}
