/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Reference frames and the rotations between them.

use core::fmt;

use crate::constants::DEG2RAD;
use crate::math::rotation::{rot_x, RotationMatrix};
use crate::math::Vector3;
use crate::observers::Observer;
use crate::orientations::{e_tilt, nutation_matrix, precession_matrix, sidereal_time, PrecessDirection};
use crate::time::AstroTime;

/// The reference frames this crate rotates among.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// J2000 mean equator and equinox.
    EQJ,
    /// True equator and equinox of date.
    EQD,
    /// J2000 ecliptic.
    ECL,
    /// True ecliptic of date.
    ECT,
    /// Topocentric horizon: x north, y west, z zenith.
    HOR,
    /// Galactic (IAU 1958).
    GAL,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Obliquity of the J2000 ecliptic, degrees.
const ECL_OBLIQUITY_J2000: f64 = 23.439_279_444_444_445;

/// Rotation from the J2000 equator to the J2000 ecliptic.
pub fn rotation_eqj_ecl() -> RotationMatrix {
    RotationMatrix {
        rot_mat: rot_x(ECL_OBLIQUITY_J2000 * DEG2RAD),
    }
}

pub fn rotation_ecl_eqj() -> RotationMatrix {
    rotation_eqj_ecl().inverse()
}

/// Rotation from the J2000 equator to the true equator of date (precession
/// then nutation).
pub fn rotation_eqj_eqd(time: AstroTime) -> RotationMatrix {
    precession_matrix(time, PrecessDirection::From2000)
        .combine(&nutation_matrix(time, PrecessDirection::From2000))
}

pub fn rotation_eqd_eqj(time: AstroTime) -> RotationMatrix {
    rotation_eqj_eqd(time).inverse()
}

/// Rotation from the true equator of date to the true ecliptic of date.
pub fn rotation_eqd_ect(time: AstroTime) -> RotationMatrix {
    RotationMatrix {
        rot_mat: rot_x(e_tilt(time).tobl * DEG2RAD),
    }
}

pub fn rotation_ect_eqd(time: AstroTime) -> RotationMatrix {
    rotation_eqd_ect(time).inverse()
}

/// Rotation from the J2000 equator to the true ecliptic of date.
pub fn rotation_eqj_ect(time: AstroTime) -> RotationMatrix {
    rotation_eqj_eqd(time).combine(&rotation_eqd_ect(time))
}

pub fn rotation_ect_eqj(time: AstroTime) -> RotationMatrix {
    rotation_eqj_ect(time).inverse()
}

/// Rotation from the true equator of date to the topocentric horizon frame of
/// the given observer (x north, y west, z zenith).
pub fn rotation_eqd_hor(time: AstroTime, observer: &Observer) -> RotationMatrix {
    let sinlat = (observer.latitude * DEG2RAD).sin();
    let coslat = (observer.latitude * DEG2RAD).cos();
    let sinlon = (observer.longitude * DEG2RAD).sin();
    let coslon = (observer.longitude * DEG2RAD).cos();

    let uze = Vector3::new(coslat * coslon, coslat * sinlon, sinlat);
    let une = Vector3::new(-sinlat * coslon, -sinlat * sinlon, coslat);
    let uwe = Vector3::new(sinlon, -coslon, 0.0);

    // Spin the geographic basis into the frame of date by the sidereal angle.
    let angle = -15.0 * sidereal_time(time) * DEG2RAD;
    let (s, c) = angle.sin_cos();
    let spin = |v: &Vector3| Vector3::new(v.x * c + v.y * s, -v.x * s + v.y * c, v.z);
    let uz = spin(&uze);
    let un = spin(&une);
    let uw = spin(&uwe);

    RotationMatrix::from_rows([
        [un.x, un.y, un.z],
        [uw.x, uw.y, uw.z],
        [uz.x, uz.y, uz.z],
    ])
}

pub fn rotation_hor_eqd(time: AstroTime, observer: &Observer) -> RotationMatrix {
    rotation_eqd_hor(time, observer).inverse()
}

/// Rotation from the J2000 equator to the horizon frame of the observer.
pub fn rotation_eqj_hor(time: AstroTime, observer: &Observer) -> RotationMatrix {
    rotation_eqj_eqd(time).combine(&rotation_eqd_hor(time, observer))
}

/// Rotation from the J2000 equator to galactic coordinates (IAU 1958).
pub fn rotation_eqj_gal() -> RotationMatrix {
    RotationMatrix::from_rows([
        [-0.054_875_560_416_215, -0.873_437_090_234_885, -0.483_835_015_548_713],
        [0.494_109_427_875_584, -0.444_829_629_960_011, 0.746_982_244_497_219],
        [-0.867_666_149_019_005, -0.198_076_373_431_202, 0.455_983_776_175_067],
    ])
}

pub fn rotation_gal_eqj() -> RotationMatrix {
    rotation_eqj_gal().inverse()
}

#[cfg(test)]
mod ut_frames {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn all_rotations_orthonormal() {
        let t = AstroTime::from_ut(7305.0);
        let obs = Observer::new(35.0, -110.0, 1000.0).unwrap();
        let mats = [
            rotation_eqj_ecl(),
            rotation_eqj_eqd(t),
            rotation_eqd_ect(t),
            rotation_eqj_ect(t),
            rotation_eqd_hor(t, &obs),
            rotation_eqj_hor(t, &obs),
            rotation_eqj_gal(),
        ];
        for m in &mats {
            let prod = m.rot_mat * m.rot_mat.transpose();
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_abs_diff_eq!(prod[(i, j)], expected, epsilon = 1e-9);
                }
            }
            assert_abs_diff_eq!(m.rot_mat.determinant(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn galactic_pole() {
        // The north galactic pole is near RA 12h51.4m, Dec +27.13 deg (J2000).
        let m = rotation_eqj_gal();
        let pole_gal = Vector3::new(0.0, 0.0, 1.0);
        let pole_eqj = m.inverse().rotate_vector3(&pole_gal);
        let dec = pole_eqj.z.asin().to_degrees();
        let ra = pole_eqj.y.atan2(pole_eqj.x).to_degrees().rem_euclid(360.0) / 15.0;
        assert_abs_diff_eq!(dec, 27.128, epsilon = 0.01);
        assert_abs_diff_eq!(ra, 12.857, epsilon = 0.01);
    }

    #[test]
    fn zenith_maps_to_z_in_horizon() {
        // A vector toward the observer's zenith must land on +z in HOR.
        let t = AstroTime::from_ut(1234.5);
        let obs = Observer::new(40.0, -75.0, 0.0).unwrap();
        let gast = sidereal_time(t);
        let lst_deg = (gast * 15.0 + obs.longitude).rem_euclid(360.0);
        let latr = obs.latitude * DEG2RAD;
        let zen_eqd = Vector3::new(
            latr.cos() * (lst_deg * DEG2RAD).cos(),
            latr.cos() * (lst_deg * DEG2RAD).sin(),
            latr.sin(),
        );
        let hor = rotation_eqd_hor(t, &obs).rotate_vector3(&zen_eqd);
        assert_abs_diff_eq!(hor.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hor.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hor.z, 1.0, epsilon = 1e-9);
    }
}
