//! Advisory topology checks. None of these reject a mesh.

use std::collections::HashSet;

use super::Mesh;

impl Mesh {
    /// Checks that all polygons share one orientation.
    ///
    /// Two consistently wound neighbours walk their shared edge in opposite
    /// directions, so a directed edge appearing twice means a flipped face.
    pub fn check_winding(&self) -> bool {
        let mut edges = HashSet::new();
        self.polygons
            .iter()
            .flat_map(|p| p.edges())
            .all(|edge| edges.insert(edge))
    }

    /// Checks that the mesh is a closed surface.
    ///
    /// Every directed edge must be cancelled by its reverse somewhere else.
    pub fn check_manifold(&self) -> bool {
        let mut open = HashSet::new();
        for (from, to) in self.polygons.iter().flat_map(|p| p.edges()) {
            if !open.remove(&(to, from)) {
                open.insert((from, to));
            }
        }
        open.is_empty()
    }

    /// Number of connected parts beyond the first.
    ///
    /// Vertices are connected by polygon edges; a vertex no polygon uses is a
    /// part of its own. Returns 0 for meshes with fewer than two vertices.
    pub fn unconnected_parts(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }

        let mut parts = DisjointSet::new(n);
        for (from, to) in self.polygons.iter().flat_map(|p| p.edges()) {
            parts.union(from, to);
        }
        parts.count() - 1
    }
}

/// Union-find over vertex indices.
struct DisjointSet {
    parent: Vec<usize>,
    count: usize,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            count: n,
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
            self.count -= 1;
        }
    }

    fn count(&self) -> usize {
        self.count
    }
}
