/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use core::ops::{Add, Neg, Sub};

use crate::constants::{DEG2RAD, RAD2DEG};
use crate::errors::{AlmagestError, AlmagestResult, DomainSnafu};
use crate::math::Vector3;
use crate::time::AstroTime;
use snafu::ensure;

/// A Cartesian position in astronomical units, valid at a given time.
///
/// The bare [Vector3] alias serves as the compact, time-free form used in the
/// integrator inner loops; `AstroVector` is what crosses the public API.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AstroVector {
    /// Position in AU.
    pub pos: Vector3,
    /// Time at which this position is valid.
    pub time: AstroTime,
}

impl AstroVector {
    pub fn new(x: f64, y: f64, z: f64, time: AstroTime) -> Self {
        Self {
            pos: Vector3::new(x, y, z),
            time,
        }
    }

    pub fn from_vector3(pos: Vector3, time: AstroTime) -> Self {
        Self { pos, time }
    }

    /// Returns the magnitude of the position vector in AU.
    pub fn length(&self) -> f64 {
        self.pos.norm()
    }

    /// Returns a copy of this vector stamped with another time.
    ///
    /// Used by the light-travel pipeline which computes a backdated position
    /// but reports it at the observation time.
    pub fn with_time(self, time: AstroTime) -> Self {
        Self {
            pos: self.pos,
            time,
        }
    }
}

impl Add for AstroVector {
    type Output = AstroVector;

    /// Vector addition; keeps the time of the left-hand operand.
    fn add(self, rhs: Self) -> Self {
        Self {
            pos: self.pos + rhs.pos,
            time: self.time,
        }
    }
}

impl Sub for AstroVector {
    type Output = AstroVector;

    fn sub(self, rhs: Self) -> Self {
        Self {
            pos: self.pos - rhs.pos,
            time: self.time,
        }
    }
}

impl Neg for AstroVector {
    type Output = AstroVector;

    fn neg(self) -> Self {
        Self {
            pos: -self.pos,
            time: self.time,
        }
    }
}

/// Position and velocity in AU and AU/day, valid at a given time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateVector {
    pub pos: Vector3,
    pub vel: Vector3,
    pub time: AstroTime,
}

impl StateVector {
    pub fn new(pos: Vector3, vel: Vector3, time: AstroTime) -> Self {
        Self { pos, vel, time }
    }

    pub fn position(&self) -> AstroVector {
        AstroVector {
            pos: self.pos,
            time: self.time,
        }
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: Self) -> Self {
        Self {
            pos: self.pos - rhs.pos,
            vel: self.vel - rhs.vel,
            time: self.time,
        }
    }
}

/// Spherical coordinates: latitude and longitude in degrees, distance in AU.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spherical {
    /// Latitude in degrees, in [-90, +90].
    pub lat: f64,
    /// Longitude in degrees, in [0, 360).
    pub lon: f64,
    /// Distance in AU, positive.
    pub dist: f64,
}

impl Spherical {
    pub fn new(lat: f64, lon: f64, dist: f64) -> AlmagestResult<Self> {
        ensure!(
            (-90.0..=90.0).contains(&lat),
            DomainSnafu {
                msg: "spherical latitude must be in [-90, 90] degrees",
                value: lat,
            }
        );
        ensure!(
            dist > 0.0,
            DomainSnafu {
                msg: "spherical distance must be positive",
                value: dist,
            }
        );
        Ok(Self {
            lat,
            lon: lon.rem_euclid(360.0),
            dist,
        })
    }
}

/// Converts spherical coordinates into a Cartesian vector.
pub fn vector_from_spherical(sphere: &Spherical, time: AstroTime) -> AstroVector {
    let lat = sphere.lat * DEG2RAD;
    let lon = sphere.lon * DEG2RAD;
    let cos_lat = lat.cos();
    AstroVector::new(
        sphere.dist * cos_lat * lon.cos(),
        sphere.dist * cos_lat * lon.sin(),
        sphere.dist * lat.sin(),
        time,
    )
}

/// Converts a Cartesian vector into spherical coordinates.
pub fn spherical_from_vector(vector: &AstroVector) -> AlmagestResult<Spherical> {
    let xyproj = vector.pos.x * vector.pos.x + vector.pos.y * vector.pos.y;
    let dist = (xyproj + vector.pos.z * vector.pos.z).sqrt();
    if dist <= 0.0 {
        return Err(AlmagestError::Domain {
            msg: "cannot compute spherical coordinates of the zero vector",
            value: dist,
        });
    }
    let (lat, lon) = if xyproj == 0.0 {
        (if vector.pos.z > 0.0 { 90.0 } else { -90.0 }, 0.0)
    } else {
        let lon = RAD2DEG * vector.pos.y.atan2(vector.pos.x);
        (
            RAD2DEG * vector.pos.z.atan2(xyproj.sqrt()),
            lon.rem_euclid(360.0),
        )
    };
    Ok(Spherical { lat, lon, dist })
}

#[cfg(test)]
mod ut_vectors {
    use super::*;
    use crate::time::AstroTime;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spherical_round_trip() {
        let t = AstroTime::from_ut(0.0);
        for &(lat, lon, dist) in &[
            (0.0, 0.0, 1.0),
            (45.0, 123.0, 2.5),
            (-67.5, 359.0, 0.01),
            (89.9, 0.5, 30.0),
        ] {
            let s = Spherical::new(lat, lon, dist).unwrap();
            let v = vector_from_spherical(&s, t);
            let back = spherical_from_vector(&v).unwrap();
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-12);
            assert_abs_diff_eq!(back.lon, lon, epsilon = 1e-12);
            assert_abs_diff_eq!(back.dist, dist, epsilon = 1e-12);
        }
    }

    #[test]
    fn spherical_rejects_bad_inputs() {
        assert!(Spherical::new(91.0, 0.0, 1.0).is_err());
        assert!(Spherical::new(0.0, 0.0, 0.0).is_err());
        assert!(Spherical::new(0.0, 0.0, -1.0).is_err());
    }
}
