/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Geographic observers on the oblate Earth.

use crate::constants::{
    ANGVEL, DEG2RAD, EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING_SQUARED, KM_PER_AU, RAD2DEG,
};
use crate::errors::{AlmagestResult, DomainSnafu, NonConvergentSnafu};
use crate::math::Vector3;
use snafu::ensure;

mod refraction;
pub use refraction::{atmosphere, inverse_refraction, refraction, Atmosphere, Refraction};

/// A geographic location on Earth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive, in [-90, +90].
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Height above the reference ellipsoid in meters.
    pub height: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> AlmagestResult<Self> {
        ensure!(
            latitude.is_finite() && (-90.0..=90.0).contains(&latitude),
            DomainSnafu {
                msg: "observer latitude must be in [-90, 90] degrees",
                value: latitude,
            }
        );
        ensure!(
            longitude.is_finite(),
            DomainSnafu {
                msg: "observer longitude must be finite",
                value: longitude,
            }
        );
        ensure!(
            height.is_finite(),
            DomainSnafu {
                msg: "observer height must be finite",
                value: height,
            }
        );
        Ok(Self {
            latitude,
            longitude,
            height,
        })
    }
}

/// Geocentric position (AU) and velocity (AU/day) of an observer, in the
/// equator-of-date frame, given Greenwich apparent sidereal time in hours.
pub fn terra(observer: &Observer, gast_hours: f64) -> (Vector3, Vector3) {
    let phi = observer.latitude * DEG2RAD;
    let sinphi = phi.sin();
    let cosphi = phi.cos();
    let c = 1.0 / (cosphi * cosphi + EARTH_FLATTENING_SQUARED * sinphi * sinphi).sqrt();
    let s = EARTH_FLATTENING_SQUARED * c;
    let height_km = observer.height / 1000.0;
    let ach = EARTH_EQUATORIAL_RADIUS_KM * c + height_km;
    let ash = EARTH_EQUATORIAL_RADIUS_KM * s + height_km;
    let stlocl = (15.0 * gast_hours + observer.longitude) * DEG2RAD;
    let (sinst, cosst) = stlocl.sin_cos();

    let pos = Vector3::new(
        ach * cosphi * cosst / KM_PER_AU,
        ach * cosphi * sinst / KM_PER_AU,
        ash * sinphi / KM_PER_AU,
    );
    // ANGVEL is rad/s; velocity in AU/day.
    let omega_day = ANGVEL * 86400.0;
    let vel = Vector3::new(
        -omega_day * ach * cosphi * sinst / KM_PER_AU,
        omega_day * ach * cosphi * cosst / KM_PER_AU,
        0.0,
    );
    (pos, vel)
}

/// Recovers the geographic observer from a geocentric equator-of-date vector
/// in AU, by Newton iteration on the ellipsoid latitude equation.
///
/// # Errors
/// Fails with `NonConvergent` if the iteration has not settled after 10 steps.
pub fn inverse_terra(pos_au: &Vector3, gast_hours: f64) -> AlmagestResult<Observer> {
    let x_km = pos_au.x * KM_PER_AU;
    let y_km = pos_au.y * KM_PER_AU;
    let z_km = pos_au.z * KM_PER_AU;
    let p = x_km.hypot(y_km);
    if p < 1.0e-6 {
        // Within a millimeter of the Earth's axis: polar special case.
        let latitude = if z_km > 0.0 { 90.0 } else { -90.0 };
        let height_km = z_km.abs() - EARTH_EQUATORIAL_RADIUS_KM * EARTH_FLATTENING_SQUARED.sqrt();
        return Ok(Observer {
            latitude,
            longitude: 0.0,
            height: 1000.0 * height_km,
        });
    }

    let stlocl = y_km.atan2(x_km);
    let mut longitude = stlocl * RAD2DEG - 15.0 * gast_hours;
    longitude = longitude.rem_euclid(360.0);
    if longitude > 180.0 {
        longitude -= 360.0;
    }

    // Newton iteration for the geodetic latitude. With the height eliminated,
    // the ellipsoid equation reduces to
    //   G(lat) = z - p tan(lat) + a (1 - f) C(lat) sin(lat) = 0
    // where C(lat) = 1/sqrt(cos^2 + f sin^2) and f is the flattening ratio
    // squared.
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let f = EARTH_FLATTENING_SQUARED;
    let mut lat = z_km.atan2(p);
    let mut c = 1.0;
    let mut converged = false;
    for _ in 0..10 {
        let sinlat = lat.sin();
        let coslat = lat.cos();
        c = 1.0 / (coslat * coslat + f * sinlat * sinlat).sqrt();
        let g = z_km - p * sinlat / coslat + a * (1.0 - f) * c * sinlat;
        let dcdlat = c * c * c * sinlat * coslat * (1.0 - f);
        let dg = -p / (coslat * coslat)
            + a * (1.0 - f) * (c * coslat + sinlat * dcdlat);
        let step = g / dg;
        lat -= step;
        if step.abs() < 1.0e-14 {
            converged = true;
            break;
        }
    }
    ensure!(
        converged,
        NonConvergentSnafu {
            iter: 10usize,
            action: "recovering an observer from an equatorial vector",
        }
    );

    let sinlat = lat.sin();
    let coslat = lat.cos();
    let height_km = if coslat.abs() > sinlat.abs() {
        p / coslat - EARTH_EQUATORIAL_RADIUS_KM * c
    } else {
        z_km / sinlat - EARTH_EQUATORIAL_RADIUS_KM * c * f
    };

    Ok(Observer {
        latitude: lat * RAD2DEG,
        longitude,
        height: 1000.0 * height_km,
    })
}

#[cfg(test)]
mod ut_observers {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn terra_round_trip() {
        for &(lat, lon, h) in &[
            (0.0, 0.0, 0.0),
            (40.7128, -74.006, 10.0),
            (-33.9, 18.4, 1500.0),
            (71.2, -156.8, 3.0),
        ] {
            let obs = Observer::new(lat, lon, h).unwrap();
            let gast = 4.321;
            let (pos, _) = terra(&obs, gast);
            let back = inverse_terra(&pos, gast).unwrap();
            assert_abs_diff_eq!(back.latitude, lat, epsilon = 1e-6);
            assert_abs_diff_eq!(back.longitude, lon, epsilon = 1e-6);
            assert_abs_diff_eq!(back.height, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn polar_special_case() {
        let obs = Observer::new(90.0, 0.0, 25.0).unwrap();
        let (pos, vel) = terra(&obs, 0.0);
        assert_abs_diff_eq!(vel.norm(), 0.0, epsilon = 1e-12);
        let back = inverse_terra(&pos, 0.0).unwrap();
        assert_abs_diff_eq!(back.latitude, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.height, 25.0, epsilon = 1.0);
    }

    #[test]
    fn rejects_bad_latitude() {
        assert!(Observer::new(90.1, 0.0, 0.0).is_err());
        assert!(Observer::new(f64::NAN, 0.0, 0.0).is_err());
    }
}
