//! Single point light and flat shading.

use nalgebra::Point3;

use crate::transform::normalize_or_zero;
use crate::{Color, Polyface};

/// Lowest diffuse intensity; faces turned away from the light stay visible.
pub const AMBIENT: f64 = 0.1;

/// A point light shared by the whole scene. There is no shadowing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Point3<f64>,
    pub color: Color,
}

impl Light {
    pub fn new(color: Color, position: Point3<f64>) -> Self {
        Self { position, color }
    }

    /// Flat-shades a face: one color for the whole polygon.
    ///
    /// The light direction is taken towards the centroid of the first three
    /// vertices, and the diffuse term never drops below [`AMBIENT`].
    pub fn shade(&self, face: &Polyface) -> Color {
        let v = face.vertices();
        let center = Point3::from((v[0].coords + v[1].coords + v[2].coords) / 3.0);
        let direction = normalize_or_zero(self.position - center);
        let intensity = face.normal().dot(&direction).max(AMBIENT);
        face.color().modulate(&self.color, intensity)
    }
}
