//! Near-plane clipping in homogeneous clip space and screen mapping.

use nalgebra::{Point3, Vector4};

/// Distance of the near plane. Vertices with `w < Z_NEAR` are clipped.
pub const Z_NEAR: f64 = 0.1;

/// Edges whose `w` changes by no more than this have no intersection.
const CLIP_EPSILON: f64 = 1e-5;

/// Clips a clip-space polygon against `w >= Z_NEAR`.
///
/// Single-plane Sutherland-Hodgman. Returns `None` when fewer than three
/// vertices survive.
pub fn clip_against_near_plane(vertices: &[Vector4<f64>]) -> Option<Vec<Vector4<f64>>> {
    let n = vertices.len();
    let mut output = Vec::with_capacity(n + 1);

    for i in 0..n {
        let v1 = &vertices[i];
        let v2 = &vertices[(i + 1) % n];
        let v1_inside = v1.w >= Z_NEAR;
        let v2_inside = v2.w >= Z_NEAR;

        match (v1_inside, v2_inside) {
            (true, true) => output.push(*v2),
            (true, false) => output.extend(intersect_near_plane(v1, v2)),
            (false, true) => {
                output.extend(intersect_near_plane(v1, v2));
                output.push(*v2);
            }
            (false, false) => {}
        }
    }

    (output.len() >= 3).then_some(output)
}

/// Point where the segment `v1..v2` crosses `w = Z_NEAR`.
///
/// The result has `w` set to exactly `Z_NEAR`. `None` when the segment is
/// (nearly) parallel to the plane.
pub fn intersect_near_plane(v1: &Vector4<f64>, v2: &Vector4<f64>) -> Option<Vector4<f64>> {
    let dw = v2.w - v1.w;
    if dw.abs() <= CLIP_EPSILON {
        return None;
    }
    let t = ((Z_NEAR - v1.w) / dw).clamp(0.0, 1.0);

    let p = v1 + (v2 - v1) * t;
    Some(Vector4::new(p.x, p.y, p.z, Z_NEAR))
}

/// Perspective divide followed by the viewport mapping.
///
/// NDC `x` in `[-1, 1]` maps to `[0, width]`, NDC `y` is flipped so that `+1`
/// is the top row. The NDC depth is kept as `z`. Returns `None` for a vertex
/// at or behind the camera (`w <= 0`).
pub fn to_screen(v: &Vector4<f64>, width: f64, height: f64) -> Option<Point3<f64>> {
    if v.w <= 0.0 {
        return None;
    }
    let (x, y, z) = (v.x / v.w, v.y / v.w, v.z / v.w);
    Some(Point3::new((x + 1.0) * 0.5 * width, (1.0 - y) * 0.5 * height, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fully_inside_is_unchanged_up_to_rotation() {
        let tri = [
            Vector4::new(0.0, 0.0, 0.0, 1.0),
            Vector4::new(1.0, 0.0, 0.0, 2.0),
            Vector4::new(0.0, 1.0, 0.0, 3.0),
        ];
        let clipped = clip_against_near_plane(&tri).unwrap();
        // each edge contributes its end vertex
        assert_eq!(clipped, vec![tri[1], tri[2], tri[0]]);
    }

    #[test]
    fn fully_behind_is_dropped() {
        let tri = [
            Vector4::new(0.0, 0.0, 0.0, -1.0),
            Vector4::new(1.0, 0.0, 0.0, 0.05),
            Vector4::new(0.0, 1.0, 0.0, -3.0),
        ];
        assert!(clip_against_near_plane(&tri).is_none());
    }

    #[test]
    fn one_vertex_behind_gives_quad() {
        let tri = [
            Vector4::new(0.0, 0.0, 0.0, -1.0),
            Vector4::new(1.0, 0.0, 0.0, 1.0),
            Vector4::new(0.0, 1.0, 0.0, 1.0),
        ];
        let clipped = clip_against_near_plane(&tri).unwrap();
        assert_eq!(clipped.len(), 4);

        let on_plane: Vec<_> = clipped.iter().filter(|v| v.w == Z_NEAR).collect();
        assert_eq!(on_plane.len(), 2);
        assert!(clipped.iter().all(|v| v.w >= Z_NEAR));

        // first edge crosses at t = 0.55
        assert_relative_eq!(clipped[0].x, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn two_vertices_behind_gives_triangle() {
        let tri = [
            Vector4::new(0.0, 0.0, 0.0, 2.0),
            Vector4::new(1.0, 0.0, 0.0, -2.0),
            Vector4::new(0.0, 1.0, 0.0, -2.0),
        ];
        let clipped = clip_against_near_plane(&tri).unwrap();
        assert_eq!(clipped.len(), 3);
        assert_eq!(clipped.iter().filter(|v| v.w == Z_NEAR).count(), 2);
    }

    #[test]
    fn intersection_rejects_parallel_edges() {
        let a = Vector4::new(0.0, 0.0, 0.0, 0.05);
        let b = Vector4::new(1.0, 0.0, 0.0, 0.05 + 1e-6);
        assert!(intersect_near_plane(&a, &b).is_none());
    }

    #[test]
    fn intersection_is_clamped() {
        // both above the plane: t would be negative
        let a = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(2.0, 0.0, 0.0, 2.0);
        let p = intersect_near_plane(&a, &b).unwrap();
        assert_eq!(p, Vector4::new(0.0, 0.0, 0.0, Z_NEAR));
    }

    #[test]
    fn screen_mapping() {
        let center = to_screen(&Vector4::new(0.0, 0.0, 0.5, 2.0), 800.0, 400.0).unwrap();
        assert_relative_eq!(center, Point3::new(400.0, 200.0, 0.25));

        let top_left = to_screen(&Vector4::new(-1.0, 1.0, 0.0, 1.0), 800.0, 400.0).unwrap();
        assert_relative_eq!(top_left, Point3::new(0.0, 0.0, 0.0));

        assert!(to_screen(&Vector4::new(1.0, 1.0, 1.0, 0.0), 800.0, 400.0).is_none());
    }
}
