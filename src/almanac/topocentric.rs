/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Topocentric observation pipeline: apparent equatorial coordinates,
//! horizontal coordinates, and observer vectors.

use super::Almanac;
use crate::astro::{EclipticCoords, Equatorial, Horizontal};
use crate::constants::{DEG2RAD, HOUR2RAD, RAD2DEG, RAD2HOUR};
use crate::ephemerides::Body;
use crate::errors::AlmagestResult;
use crate::frames::rotation_eqd_ect;
use crate::math::vectors::{spherical_from_vector, AstroVector, StateVector};
use crate::math::Vector3;
use crate::observers::{inverse_refraction, refraction, terra, Observer, Refraction};
use crate::orientations::{gyration, sidereal_time, PrecessDirection};
use crate::time::AstroTime;

impl Almanac {
    /// Geocentric position of an observer, in the J2000 frame or the
    /// equator-of-date frame.
    pub fn observer_vector(
        &self,
        time: AstroTime,
        observer: &Observer,
        of_date: bool,
    ) -> AstroVector {
        let gast = sidereal_time(time);
        let (pos, _) = terra(observer, gast);
        let vec = AstroVector::from_vector3(pos, time);
        if of_date {
            vec
        } else {
            gyration(&vec, time, PrecessDirection::Into2000)
        }
    }

    /// Geocentric position and velocity of an observer.
    pub fn observer_state(
        &self,
        time: AstroTime,
        observer: &Observer,
        of_date: bool,
    ) -> StateVector {
        let gast = sidereal_time(time);
        let (pos, vel) = terra(observer, gast);
        let state = StateVector::new(pos, vel, time);
        if of_date {
            state
        } else {
            let pos2000 = gyration(
                &AstroVector::from_vector3(state.pos, time),
                time,
                PrecessDirection::Into2000,
            );
            let vel2000 = gyration(
                &AstroVector::from_vector3(state.vel, time),
                time,
                PrecessDirection::Into2000,
            );
            StateVector::new(pos2000.pos, vel2000.pos, time)
        }
    }

    /// Recovers the observer location from a geocentric vector previously
    /// produced by [Almanac::observer_vector].
    pub fn vector_observer(
        &self,
        vector: &AstroVector,
        of_date: bool,
    ) -> AlmagestResult<Observer> {
        let gast = sidereal_time(vector.time);
        let eqd = if of_date {
            *vector
        } else {
            gyration(vector, vector.time, PrecessDirection::From2000)
        };
        crate::observers::inverse_terra(&eqd.pos, gast)
    }

    /// Apparent topocentric equatorial coordinates of a body.
    ///
    /// Composes the geocentric apparent vector with the observer parallax
    /// shift; `of_date` selects the equator and equinox of date over J2000,
    /// `aberration` enables the stellar aberration correction.
    pub fn equator(
        &self,
        body: Body,
        time: AstroTime,
        observer: &Observer,
        of_date: bool,
        aberration: bool,
    ) -> AlmagestResult<Equatorial> {
        let gc_observer = self.observer_vector(time, observer, false);
        let geo = self.geo_vector(body, time, aberration)?;
        let topo = AstroVector::from_vector3(geo.pos - gc_observer.pos, time);
        let oriented = if of_date {
            gyration(&topo, time, PrecessDirection::From2000)
        } else {
            topo
        };
        let sphere = spherical_from_vector(&oriented)?;
        Ok(Equatorial {
            ra: sphere.lon / 15.0,
            dec: sphere.lat,
            dist: sphere.dist,
            vec: oriented,
        })
    }

    /// Converts apparent equatorial coordinates of date into horizontal
    /// coordinates for the observer, applying refraction per `mode`.
    ///
    /// When refraction lifts the altitude, the reported RA/Dec are
    /// back-computed through the lifted direction so they include the
    /// refractive shift.
    pub fn horizontal(
        &self,
        time: AstroTime,
        observer: &Observer,
        ra: f64,
        dec: f64,
        mode: Refraction,
    ) -> Horizontal {
        let sinlat = (observer.latitude * DEG2RAD).sin();
        let coslat = (observer.latitude * DEG2RAD).cos();
        let sinlon = (observer.longitude * DEG2RAD).sin();
        let coslon = (observer.longitude * DEG2RAD).cos();
        let sindc = (dec * DEG2RAD).sin();
        let cosdc = (dec * DEG2RAD).cos();
        let sinra = (ra * HOUR2RAD).sin();
        let cosra = (ra * HOUR2RAD).cos();

        // Observer-local orthonormal basis in the frame of date.
        let mut uze = Vector3::new(coslat * coslon, coslat * sinlon, sinlat);
        let mut une = Vector3::new(-sinlat * coslon, -sinlat * sinlon, coslat);
        let mut uwe = Vector3::new(sinlon, -coslon, 0.0);

        let angle = -15.0 * sidereal_time(time) * DEG2RAD;
        let (s, c) = angle.sin_cos();
        let spin = |v: &Vector3| Vector3::new(v.x * c + v.y * s, -v.x * s + v.y * c, v.z);
        uze = spin(&uze);
        une = spin(&une);
        uwe = spin(&uwe);

        let p = Vector3::new(cosdc * cosra, cosdc * sinra, sindc);
        let pz = p.dot(&uze);
        let pn = p.dot(&une);
        let pw = p.dot(&uwe);

        let proj = pn.hypot(pw);
        let mut az = 0.0;
        if proj > 0.0 {
            az = (-pw.atan2(pn)) * RAD2DEG;
            if az < 0.0 {
                az += 360.0;
            } else if az >= 360.0 {
                az -= 360.0;
            }
        }
        let zd_rad = proj.atan2(pz);
        let mut hor_ra = ra;
        let mut hor_dec = dec;

        let refr = refraction(mode, 90.0 - zd_rad * RAD2DEG);
        let zd = zd_rad * RAD2DEG - refr;
        if refr > 0.0 && zd > 3.0e-4 {
            // Lift the direction vector by the refraction and re-read RA/Dec
            // from the lifted vector.
            let zdr = zd * DEG2RAD;
            let (sinzd, coszd) = zdr.sin_cos();
            let (sinzd0, coszd0) = zd_rad.sin_cos();
            let pr = (p - uze * coszd0) * (sinzd / sinzd0) + uze * coszd;
            let proj = pr.x.hypot(pr.y);
            if proj > 0.0 {
                hor_ra = pr.y.atan2(pr.x) * RAD2HOUR;
                if hor_ra < 0.0 {
                    hor_ra += 24.0;
                }
            } else {
                hor_ra = 0.0;
            }
            hor_dec = pr.z.atan2(proj) * RAD2DEG;
        }

        Horizontal {
            azimuth: az,
            altitude: 90.0 - zd,
            ra: hor_ra,
            dec: hor_dec,
        }
    }

    /// Altitude and azimuth of a body, with the common corrections chained:
    /// light travel, aberration, topocentric parallax and refraction.
    pub fn body_horizontal(
        &self,
        body: Body,
        time: AstroTime,
        observer: &Observer,
        mode: Refraction,
    ) -> AlmagestResult<Horizontal> {
        let equ = self.equator(body, time, observer, true, true)?;
        Ok(self.horizontal(time, observer, equ.ra, equ.dec, mode))
    }

    /// Converts a J2000 equatorial vector into ecliptic-of-date coordinates.
    pub fn ecliptic(&self, vector: &AstroVector) -> AlmagestResult<EclipticCoords> {
        let eqd = gyration(vector, vector.time, PrecessDirection::From2000);
        let ect = rotation_eqd_ect(vector.time).rotate(&eqd);
        let sphere = spherical_from_vector(&ect)?;
        Ok(EclipticCoords {
            vec: ect,
            elat: sphere.lat,
            elon: sphere.lon,
        })
    }

    /// Apparent ecliptic-of-date longitude of a body seen from Earth, degrees
    /// in [0, 360).
    pub fn ecliptic_longitude(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        let geo = self.geo_vector(body, time, true)?;
        Ok(self.ecliptic(&geo)?.elon)
    }

    /// Removes the inverse refraction from an observed altitude, for callers
    /// that measured a bent altitude and need the true one.
    pub fn dealtitude(&self, mode: Refraction, bent_altitude: f64) -> f64 {
        bent_altitude + inverse_refraction(mode, bent_altitude)
    }
}

#[cfg(test)]
mod ut_topocentric {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn observer_round_trip() {
        let almanac = Almanac::new();
        let time = AstroTime::from_civil(2021, 3, 14, 15, 9, 26.0);
        for of_date in [false, true] {
            let observer = Observer::new(37.7749, -122.4194, 52.0).unwrap();
            let vec = almanac.observer_vector(time, &observer, of_date);
            let back = almanac.vector_observer(&vec, of_date).unwrap();
            assert_abs_diff_eq!(back.latitude, observer.latitude, epsilon = 1e-9);
            assert_abs_diff_eq!(back.longitude, observer.longitude, epsilon = 1e-9);
            assert_abs_diff_eq!(back.height, observer.height, epsilon = 1e-3);
        }
    }

    #[test]
    fn zenith_body_has_altitude_90() {
        // A made-up RA/Dec equal to the observer's zenith maps to altitude 90.
        let almanac = Almanac::new();
        let time = AstroTime::from_ut(700.25);
        let observer = Observer::new(-20.0, 47.5, 0.0).unwrap();
        let gast = sidereal_time(time);
        let ra = (gast + observer.longitude / 15.0).rem_euclid(24.0);
        let hor = almanac.horizontal(time, &observer, ra, observer.latitude, Refraction::None);
        assert_abs_diff_eq!(hor.altitude, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn refraction_lifts_ra_dec() {
        let almanac = Almanac::new();
        let time = AstroTime::from_ut(4000.0);
        let observer = Observer::new(52.0, 13.4, 30.0).unwrap();
        // Pick a direction near the horizon: hour angle ~6h east.
        let gast = sidereal_time(time);
        let ra = (gast + observer.longitude / 15.0 + 6.0).rem_euclid(24.0);
        let none = almanac.horizontal(time, &observer, ra, 10.0, Refraction::None);
        let norm = almanac.horizontal(time, &observer, ra, 10.0, Refraction::Normal);
        assert!(norm.altitude > none.altitude);
        assert!((norm.ra - none.ra).abs() + (norm.dec - none.dec).abs() > 1e-6);
    }
}
