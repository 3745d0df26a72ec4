/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use crate::constants::DEG2RAD;
use crate::math::{Matrix3, Vector3};
use crate::math::vectors::{AstroVector, StateVector};

/// An orthonormal 3x3 rotation matrix.
///
/// Applied by premultiplication to column vectors. The inverse of a rotation
/// is its transpose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotationMatrix {
    pub rot_mat: Matrix3,
}

impl RotationMatrix {
    pub fn identity() -> Self {
        Self {
            rot_mat: Matrix3::identity(),
        }
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self {
            rot_mat: Matrix3::new(
                rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
                rows[2][1], rows[2][2],
            ),
        }
    }

    /// Returns the inverse rotation (the transpose).
    pub fn inverse(&self) -> Self {
        Self {
            rot_mat: self.rot_mat.transpose(),
        }
    }

    /// Re-orients this rotation by `angle_deg` about the given coordinate axis
    /// (0 = x, 1 = y, 2 = z), returning the composed rotation.
    pub fn pivot(&self, axis: usize, angle_deg: f64) -> Self {
        let radians = angle_deg * DEG2RAD;
        let (s, c) = radians.sin_cos();
        let i = (axis + 1) % 3;
        let j = (axis + 2) % 3;
        let k = axis % 3;
        let m = &self.rot_mat;
        let mut out = Matrix3::zeros();
        for col in 0..3 {
            out[(i, col)] = c * m[(i, col)] - s * m[(j, col)];
            out[(j, col)] = s * m[(i, col)] + c * m[(j, col)];
            out[(k, col)] = m[(k, col)];
        }
        Self { rot_mat: out }
    }

    /// Composes two rotations such that applying the result equals applying
    /// `self` first, then `other`: `combine(a, b).rotate(v) == b.rotate(a.rotate(v))`.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            rot_mat: other.rot_mat * self.rot_mat,
        }
    }

    pub fn rotate_vector3(&self, v: &Vector3) -> Vector3 {
        self.rot_mat * v
    }

    pub fn rotate(&self, v: &AstroVector) -> AstroVector {
        AstroVector {
            pos: self.rot_mat * v.pos,
            time: v.time,
        }
    }

    pub fn rotate_state(&self, s: &StateVector) -> StateVector {
        StateVector {
            pos: self.rot_mat * s.pos,
            vel: self.rot_mat * s.vel,
            time: s.time,
        }
    }
}

/// Rotation about the X axis by `angle_rad`, as a bare matrix.
pub(crate) fn rot_x(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Rotation about the Z axis by `angle_rad`, as a bare matrix.
pub(crate) fn rot_z(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod ut_rotation {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pivot_is_orthonormal() {
        let r = RotationMatrix::identity()
            .pivot(0, 30.0)
            .pivot(1, -45.0)
            .pivot(2, 123.456);
        let should_be_identity = r.rot_mat * r.rot_mat.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-14);
            }
        }
        assert_abs_diff_eq!(r.rot_mat.determinant(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn combine_order() {
        let a = RotationMatrix::identity().pivot(2, 90.0);
        let b = RotationMatrix::identity().pivot(0, 90.0);
        let c = a.combine(&b);
        let v = Vector3::new(1.0, 0.0, 0.0);
        let direct = b.rotate_vector3(&a.rotate_vector3(&v));
        let composed = c.rotate_vector3(&v);
        assert_abs_diff_eq!((direct - composed).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn inverse_undoes_rotation() {
        let r = RotationMatrix::identity().pivot(1, 77.7);
        let v = Vector3::new(0.3, -0.4, 0.5);
        let back = r.inverse().rotate_vector3(&r.rotate_vector3(&v));
        assert_abs_diff_eq!((back - v).norm(), 0.0, epsilon = 1e-14);
    }
}
