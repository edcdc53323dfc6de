//! Plane selection strategies for BSP tree construction.
//!
//! The choice of splitting plane affects tree balance and the number of
//! polygon splits during construction. Different strategies offer different
//! trade-offs between build time and tree quality.

use crate::{Classification, Polyface};

use super::node::FaceId;

/// Strategy for selecting which polygon's plane to use for splitting.
pub trait PlaneSelector {
    /// Select one of `candidates` (ids into `faces`) as the splitter.
    ///
    /// Returns `None` if `candidates` is empty. The returned id must be one
    /// of `candidates`.
    fn select(&self, faces: &[Polyface], candidates: &[FaceId]) -> Option<FaceId>;
}

/// Selects the first polygon in the list.
///
/// The fastest selector, but may produce unbalanced trees and many splits
/// depending on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPolygon;

impl PlaneSelector for FirstPolygon {
    fn select(&self, _faces: &[Polyface], candidates: &[FaceId]) -> Option<FaceId> {
        candidates.first().copied()
    }
}

/// Picks the sampled candidate with the lowest balance + split cost.
///
/// `cost = weight_balance * |front - back| + weight_split * spanning`, counted
/// over every other polygon; coplanar polygons do not contribute. At most
/// `max_candidates` polygons are tried, sampled with a fixed stride; a stride
/// of 1 tries every polygon (optimal, quadratic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostHeuristic {
    pub weight_balance: f64,
    pub weight_split: f64,
    pub max_candidates: usize,
}

impl Default for CostHeuristic {
    fn default() -> Self {
        Self {
            weight_balance: 1.0,
            weight_split: 10.0,
            max_candidates: 20,
        }
    }
}

impl CostHeuristic {
    /// Cost of splitting `candidates` with the plane of `splitter`.
    pub fn cost(&self, faces: &[Polyface], splitter: FaceId, candidates: &[FaceId]) -> f64 {
        let plane = faces[splitter.index()].plane();
        let (mut front, mut back, mut spanning) = (0usize, 0usize, 0usize);

        for &id in candidates {
            if id == splitter {
                continue;
            }
            match faces[id.index()].classify(plane) {
                Classification::Front => front += 1,
                Classification::Back => back += 1,
                Classification::Spanning => spanning += 1,
                Classification::Coplanar => {}
            }
        }

        self.weight_balance * front.abs_diff(back) as f64 + self.weight_split * spanning as f64
    }
}

impl PlaneSelector for CostHeuristic {
    fn select(&self, faces: &[Polyface], candidates: &[FaceId]) -> Option<FaceId> {
        let size = candidates.len();
        let samples = size.min(self.max_candidates.max(1));
        if samples == 0 {
            return None;
        }
        let stride = size / samples;

        let mut best: Option<(FaceId, f64)> = None;
        for &candidate in candidates.iter().step_by(stride) {
            let cost = self.cost(faces, candidate, candidates);
            // strict comparison keeps the first candidate on ties
            if best.is_none_or(|(_, min)| cost < min) {
                best = Some((candidate, cost));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use nalgebra::Point3;

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

    /// Triangle parallel to the XY plane at depth `z`.
    fn slab(z: f64) -> Polyface {
        make_triangle([0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z])
    }

    fn ids(n: usize) -> Vec<FaceId> {
        (0..n).map(FaceId).collect()
    }

    #[test]
    fn first_polygon_empty_and_multiple() {
        let faces = vec![slab(0.0), slab(1.0)];
        assert!(FirstPolygon.select(&faces, &[]).is_none());
        assert_eq!(FirstPolygon.select(&faces, &[FaceId(1), FaceId(0)]), Some(FaceId(1)));
    }

    #[test]
    fn cost_heuristic_empty() {
        assert!(CostHeuristic::default().select(&[], &[]).is_none());
    }

    #[test]
    fn cost_heuristic_prefers_balanced_splitter() {
        let faces: Vec<Polyface> = (0..5).map(|i| slab(i as f64)).collect();
        let selector = CostHeuristic::default();

        assert_eq!(selector.cost(&faces, FaceId(0), &ids(5)), 4.0);
        assert_eq!(selector.cost(&faces, FaceId(2), &ids(5)), 0.0);
        assert_eq!(selector.select(&faces, &ids(5)), Some(FaceId(2)));
    }

    #[test]
    fn cost_heuristic_penalizes_splits() {
        let faces = vec![
            slab(0.0),
            // spans z = 0 and z = 0.5
            make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
            slab(0.5),
        ];
        let selector = CostHeuristic::default();

        assert_eq!(selector.cost(&faces, FaceId(0), &ids(3)), 10.0 + 1.0);
        // the spanning triangle as splitter: both slabs are split by it
        assert!(selector.cost(&faces, FaceId(1), &ids(3)) >= 20.0);
    }

    #[test]
    fn cost_heuristic_ties_keep_first() {
        let faces = vec![slab(0.0), slab(1.0)];
        // both candidates cost 1
        assert_eq!(CostHeuristic::default().select(&faces, &ids(2)), Some(FaceId(0)));
    }

    #[test]
    fn cost_heuristic_samples_with_stride() {
        let faces: Vec<Polyface> = (0..5).map(|i| slab(i as f64)).collect();
        let selector = CostHeuristic {
            max_candidates: 2,
            ..CostHeuristic::default()
        };
        // stride 2: candidates 0, 2, 4; the middle one is balanced
        assert_eq!(selector.select(&faces, &ids(5)), Some(FaceId(2)));

        let selector = CostHeuristic {
            max_candidates: 1,
            ..CostHeuristic::default()
        };
        // stride 5: only candidate 0
        assert_eq!(selector.select(&faces, &ids(5)), Some(FaceId(0)));
    }
}
