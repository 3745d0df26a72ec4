/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

// Vector3 is nalgebra's Vector3 with a 64-bit floating point representation.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub mod angles;
pub mod rotation;
pub mod vectors;

/// Returns the projection of a onto b
pub fn projv(a: &Vector3, b: &Vector3) -> Vector3 {
    b * a.dot(b) / b.dot(b)
}

/// Returns the angle between two vectors in degrees, in [0, 180].
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let dot = a.dot(b) / (a.norm() * b.norm());
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}
