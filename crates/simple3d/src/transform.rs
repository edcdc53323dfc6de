//! 4x4 homogeneous transforms with row-vector semantics.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// A 4x4 transformation matrix applied to row vectors.
///
/// A point `v` maps to `v · M`, so the translation lives in the bottom row and
/// `a.then(&b)` (the product `a · b`) applies `a` first and `b` second.
///
/// The `apply_*` builders right-multiply an elementary matrix into the
/// receiver, so chained calls apply to points in call order:
///
/// ```
/// use simple3d::Transform;
/// use nalgebra::Point3;
///
/// let mut t = Transform::identity();
/// t.apply_translation(1.0, 0.0, 0.0);
/// t.apply_scale(2.0, 2.0, 2.0);
/// let p = t.transform_point(&Point3::origin());
/// assert_eq!(p.x, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Matrix4<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    /// Builds a transform from four rows, `rows[r][c]` being row `r`, column `c`.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let r = rows;
        Self {
            m: Matrix4::new(
                r[0][0], r[0][1], r[0][2], r[0][3], //
                r[1][0], r[1][1], r[1][2], r[1][3], //
                r[2][0], r[2][1], r[2][2], r[2][3], //
                r[3][0], r[3][1], r[3][2], r[3][3],
            ),
        }
    }

    /// Returns the matrix as four rows.
    pub fn rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.m[(r, c)];
            }
        }
        rows
    }

    /// Returns the underlying nalgebra matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// Exact comparison against the identity matrix.
    pub fn is_identity(&self) -> bool {
        self.m == Matrix4::identity()
    }

    /// Returns `self · other`: `self` is applied to points first.
    #[inline]
    pub fn then(&self, other: &Transform) -> Transform {
        Transform { m: self.m * other.m }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::identity();
        t.m[(3, 0)] = x;
        t.m[(3, 1)] = y;
        t.m[(3, 2)] = z;
        t
    }

    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut t = Self::identity();
        t.m[(0, 0)] = sx;
        t.m[(1, 1)] = sy;
        t.m[(2, 2)] = sz;
        t
    }

    pub fn rotation_x(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[(1, 1)] = cos;
        t.m[(1, 2)] = sin;
        t.m[(2, 1)] = -sin;
        t.m[(2, 2)] = cos;
        t
    }

    pub fn rotation_y(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[(0, 0)] = cos;
        t.m[(0, 2)] = -sin;
        t.m[(2, 0)] = sin;
        t.m[(2, 2)] = cos;
        t
    }

    pub fn rotation_z(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[(0, 0)] = cos;
        t.m[(0, 1)] = -sin;
        t.m[(1, 0)] = sin;
        t.m[(1, 1)] = cos;
        t
    }

    pub fn apply_translation(&mut self, x: f64, y: f64, z: f64) {
        *self = self.then(&Self::translation(x, y, z));
    }

    pub fn apply_scale(&mut self, sx: f64, sy: f64, sz: f64) {
        *self = self.then(&Self::scale(sx, sy, sz));
    }

    pub fn apply_rotation_x(&mut self, angle: f64) {
        *self = self.then(&Self::rotation_x(angle));
    }

    pub fn apply_rotation_y(&mut self, angle: f64) {
        *self = self.then(&Self::rotation_y(angle));
    }

    pub fn apply_rotation_z(&mut self, angle: f64) {
        *self = self.then(&Self::rotation_z(angle));
    }

    /// Perspective projection for a vertical field of view `fov` (radians).
    ///
    /// The output `w` equals the view-space `z`, which is what the near-plane
    /// clip tests against.
    pub fn projection(fov: f64, aspect_ratio: f64) -> Self {
        let f = 1.0 / (fov / 2.0).tan();
        let mut m = Matrix4::zeros();
        m[(0, 0)] = aspect_ratio * f;
        m[(1, 1)] = f;
        m[(2, 2)] = 1.0;
        m[(3, 2)] = -1.0;
        m[(2, 3)] = 1.0;
        Self { m }
    }

    /// Camera-to-world matrix looking from `pos` towards `target`.
    ///
    /// Rows are the orthonormal basis (right, up, forward) followed by the
    /// position; invert it with [`Transform::quick_inverse`] to get a view
    /// matrix.
    pub fn point_at(pos: &Point3<f64>, target: &Point3<f64>, up: &Vector3<f64>) -> Self {
        let forward = normalize_or_zero(target - pos);
        let a = forward * up.dot(&forward);
        let new_up = normalize_or_zero(up - a);
        let right = new_up.cross(&forward);

        Self::from_rows([
            [right.x, right.y, right.z, 0.0],
            [new_up.x, new_up.y, new_up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [pos.x, pos.y, pos.z, 1.0],
        ])
    }

    /// Inverse of a rotation + translation matrix.
    ///
    /// Transposes the 3x3 rotation block and recomputes the translation as
    /// `-T · Rᵀ`. Only valid when the upper-left block is orthonormal.
    pub fn quick_inverse(&self) -> Self {
        let m = &self.m;
        let mut r = Matrix4::zeros();
        for row in 0..3 {
            for col in 0..3 {
                r[(row, col)] = m[(col, row)];
            }
        }
        for col in 0..3 {
            r[(3, col)] = -(m[(3, 0)] * r[(0, col)]
                + m[(3, 1)] * r[(1, col)]
                + m[(3, 2)] * r[(2, col)]);
        }
        r[(3, 3)] = 1.0;
        Self { m: r }
    }

    /// Transforms a homogeneous row vector: `v · M`.
    #[inline]
    pub fn transform(&self, v: &Vector4<f64>) -> Vector4<f64> {
        self.m.tr_mul(v)
    }

    /// Transforms a point (w = 1) and returns the homogeneous result.
    #[inline]
    pub fn transform_homogeneous(&self, p: &Point3<f64>) -> Vector4<f64> {
        self.transform(&p.to_homogeneous())
    }

    /// Transforms a point by an affine transform, dropping `w`.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let v = self.transform_homogeneous(p);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transforms a direction (w = 0).
    #[inline]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let r = self.transform(&v.to_homogeneous());
        Vector3::new(r.x, r.y, r.z)
    }
}

/// Normalizes `v`, leaving a zero vector untouched.
pub(crate) fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let len = v.norm();
    if len != 0.0 { v / len } else { v }
}
