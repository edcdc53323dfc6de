//! Visitor pattern for BSP tree traversal.
//!
//! Visitors allow custom processing of polygons during tree traversal
//! without coupling traversal logic to specific use cases.

use crate::Polyface;

use super::node::FaceId;

/// Visitor for processing polygons during BSP tree traversal.
///
/// Implement this trait to define custom behavior when traversing the tree.
/// Common uses include:
/// - Rendering (painter's algorithm)
/// - Collecting polygon ids in sorted order
pub trait BspVisitor {
    /// Called once per node, with the node's splitter polygon.
    fn visit(&mut self, id: FaceId, face: &Polyface);
}

/// A simple visitor that collects the ids of all visited polygons.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<FaceId>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            collected: Vec::with_capacity(capacity),
        }
    }

    /// Returns the collected ids, in visit order.
    pub fn into_ids(self) -> Vec<FaceId> {
        self.collected
    }

    /// Returns a reference to the collected ids.
    pub fn ids(&self) -> &[FaceId] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, id: FaceId, _face: &Polyface) {
        self.collected.push(id);
    }
}

/// A visitor that calls a closure for each polygon.
pub struct FnVisitor<F>
where
    F: FnMut(FaceId, &Polyface),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(FaceId, &Polyface),
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BspVisitor for FnVisitor<F>
where
    F: FnMut(FaceId, &Polyface),
{
    fn visit(&mut self, id: FaceId, face: &Polyface) {
        (self.func)(id, face);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use nalgebra::Point3;

    fn make_triangle(color: Color) -> Polyface {
        Polyface::new(
            color,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
    }

    #[test]
    fn collecting_visitor_empty() {
        let visitor = CollectingVisitor::new();
        assert!(visitor.ids().is_empty());
    }

    #[test]
    fn collecting_visitor_collects_in_order() {
        let mut visitor = CollectingVisitor::new();
        let poly = make_triangle(Color::WHITE);

        visitor.visit(FaceId(3), &poly);
        visitor.visit(FaceId(1), &poly);

        assert_eq!(visitor.ids(), &[FaceId(3), FaceId(1)]);
        assert_eq!(visitor.into_ids(), vec![FaceId(3), FaceId(1)]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut colors = Vec::new();
        {
            let mut visitor = FnVisitor::new(|_, face: &Polyface| colors.push(face.color()));
            visitor.visit(FaceId(0), &make_triangle(Color::RED));
            visitor.visit(FaceId(1), &make_triangle(Color::BLUE));
        }
        assert_eq!(colors, vec![Color::RED, Color::BLUE]);
    }
}
