/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Solar elongation and the greatest-elongation search for the inner
//! planets.

use log::debug;
use snafu::ensure;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::constants::periods::{self, EARTH_ORBITAL_PERIOD};
use crate::ephemerides::Body;
use crate::errors::{
    AlmagestResult, InternalSnafu, NonConvergentSnafu, SearchFailedSnafu, UnsupportedBodySnafu,
};
use crate::math::angle_between;
use crate::math::angles::between_pm_180;
use crate::time::AstroTime;

/// When the body is best seen from Earth.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Best seen before sunrise, west of the Sun.
    Morning,
    /// Best seen after sunset, east of the Sun.
    Evening,
}

/// Elongation data for a body at a time.
#[derive(Copy, Clone, Debug)]
pub struct ElongationInfo {
    pub time: AstroTime,
    pub visibility: Visibility,
    /// Angle between the Sun and the body as seen from Earth, degrees.
    pub elongation: f64,
    /// Absolute difference of apparent ecliptic longitudes, degrees, in
    /// [0, 180].
    pub ecliptic_separation: f64,
}

impl Almanac {
    /// Angular separation between the Sun and a body as seen from Earth,
    /// degrees.
    pub fn angle_from_sun(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        let sun = self.geo_vector(Body::Sun, time, true)?;
        let other = self.geo_vector(body, time, true)?;
        Ok(angle_between(&sun.pos, &other.pos))
    }

    /// The body's elongation from the Sun and which sky it belongs to.
    pub fn elongation(&self, body: Body, time: AstroTime) -> AlmagestResult<ElongationInfo> {
        ensure!(
            body != Body::Earth,
            UnsupportedBodySnafu {
                body,
                action: "computing an elongation",
            }
        );
        let rel_lon = self.pair_longitude(body, Body::Sun, time)?;
        let (visibility, ecliptic_separation) = if rel_lon > 180.0 {
            (Visibility::Morning, 360.0 - rel_lon)
        } else {
            (Visibility::Evening, rel_lon)
        };
        Ok(ElongationInfo {
            time,
            visibility,
            elongation: self.angle_from_sun(body, time)?,
            ecliptic_separation,
        })
    }

    /// Finds the next greatest elongation of Mercury or Venus after `start`.
    pub fn search_max_elongation(
        &self,
        body: Body,
        start: AstroTime,
    ) -> AlmagestResult<ElongationInfo> {
        // Relative-longitude windows that are guaranteed to contain a
        // greatest elongation of the respective planet.
        let (s1, s2, planet_period) = match body {
            Body::Mercury => (50.0, 85.0, periods::MERCURY_ORBITAL_PERIOD),
            Body::Venus => (40.0, 50.0, periods::VENUS_ORBITAL_PERIOD),
            other => {
                return UnsupportedBodySnafu {
                    body: other,
                    action: "searching a greatest elongation",
                }
                .fail()
            }
        };
        let synodic = 1.0 / (1.0 / planet_period - 1.0 / EARTH_ORBITAL_PERIOD).abs();

        // One initial attempt plus up to two retries past stale windows.
        let mut search_time = start;
        for _ in 0..3 {
            let plon = self.helio_ecliptic_longitude(body, search_time)?;
            let elon = self.helio_ecliptic_longitude(Body::Earth, search_time)?;
            let rlon = between_pm_180(plon - elon);

            // Pick the next window [rlon_lo, rlon_hi] of relative longitude
            // that brackets a greatest elongation. Morning elongations sit
            // after inferior conjunction (positive rlon), evening ones before
            // it. When already inside a window, back up a quarter synodic
            // period so the forward-only relative-longitude search enters the
            // current window from its floor.
            let (rlon_lo, rlon_hi, adjust_days) = if (-s1..s1).contains(&rlon) {
                (s1, s2, 0.0)
            } else if rlon >= s2 || rlon < -s2 {
                (-s2, -s1, 0.0)
            } else if rlon >= 0.0 {
                (s1, s2, -synodic / 4.0)
            } else {
                (-s2, -s1, -synodic / 4.0)
            };

            let search_start = self.time_add_days(search_time, adjust_days);
            let t1 = self.search_relative_longitude(body, rlon_lo, search_start)?;
            let t2 = self.search_relative_longitude(body, rlon_hi, t1)?;

            // Negated slope of the elongation: ascends through zero at the
            // maximum.
            let neg_slope = |t: AstroTime| -> AlmagestResult<f64> {
                let dt = 0.01;
                let before = self.angle_from_sun(body, self.time_add_days(t, -dt / 2.0))?;
                let after = self.angle_from_sun(body, self.time_add_days(t, dt / 2.0))?;
                Ok((before - after) / dt)
            };
            let m1 = neg_slope(t1)?;
            ensure!(
                m1 < 0.0,
                InternalSnafu {
                    action: "verifying the elongation slope at the window floor",
                }
            );
            let m2 = neg_slope(t2)?;
            ensure!(
                m2 > 0.0,
                InternalSnafu {
                    action: "verifying the elongation slope at the window ceiling",
                }
            );

            let found = search(
                neg_slope,
                t1,
                t2,
                SearchOptions {
                    dt_tolerance_seconds: 10.0,
                    init_f1: Some(m1),
                    init_f2: Some(m2),
                    ..SearchOptions::default()
                },
            )?
            .ok_or_else(|| {
                SearchFailedSnafu {
                    action: "refining a greatest elongation",
                }
                .build()
            })?;

            if found.ut >= start.ut {
                return self.elongation(body, found);
            }
            // The window resolved to an event before the requested start;
            // move past it and try the next cycle.
            debug!("greatest elongation found before start, advancing the search window");
            search_time = self.time_add_days(t2, 1.0);
        }
        NonConvergentSnafu {
            iter: 2usize,
            action: "retrying the greatest-elongation search",
        }
        .fail()
    }
}

#[cfg(test)]
mod ut_elongation {
    use super::*;

    #[test]
    fn elongation_classifies_sky() {
        let almanac = Almanac::new();
        let time = AstroTime::from_civil(2020, 3, 24, 22, 0, 0.0);
        // Venus was an evening star in March 2020.
        let info = almanac.elongation(Body::Venus, time).unwrap();
        assert_eq!(info.visibility, Visibility::Evening);
        assert!(info.elongation > 40.0 && info.elongation < 50.0);
    }

    #[test]
    fn mercury_max_elongation_bounds() {
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2019, 1, 1, 0, 0, 0.0);
        let info = almanac.search_max_elongation(Body::Mercury, start).unwrap();
        assert!(info.time.ut >= start.ut);
        // Mercury's greatest elongation is always between 18 and 28 degrees.
        assert!(
            info.elongation > 17.0 && info.elongation < 29.0,
            "elongation {}",
            info.elongation
        );
    }

    #[test]
    fn rejects_unsupported_bodies() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac.elongation(Body::Earth, t).is_err());
        assert!(almanac.search_max_elongation(Body::Mars, t).is_err());
    }
}
