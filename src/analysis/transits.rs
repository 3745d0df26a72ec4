/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Transits of Mercury and Venus across the solar disc.

use log::debug;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::ephemerides::Body;
use crate::errors::{
    AlmagestResult, NonConvergentSnafu, SearchFailedSnafu, UnsupportedBodySnafu,
};
use crate::time::AstroTime;

/// A transit of an inner planet across the Sun, as seen from Earth.
#[derive(Copy, Clone, Debug)]
pub struct TransitInfo {
    /// First contact of the planet's shadow axis with the Earth.
    pub start: AstroTime,
    /// Minimum separation from the solar disc center.
    pub peak: AstroTime,
    /// Last contact.
    pub finish: AstroTime,
    /// Angular separation between planet and Sun center at peak, arcminutes.
    pub separation: f64,
}

const MERCURY_RADIUS_KM: f64 = 2439.7;
const VENUS_RADIUS_KM: f64 = 6051.8;

impl Almanac {
    /// Finds the next transit of Mercury or Venus after `start`.
    ///
    /// Walks inferior conjunctions; only conjunctions within 0.4 degrees of
    /// the Sun can be transits, and the shadow geometry decides the rest.
    pub fn search_transit(&self, body: Body, start: AstroTime) -> AlmagestResult<TransitInfo> {
        const THRESHOLD_ANGLE: f64 = 0.4;
        const CONTACT_WINDOW: f64 = 1.0;
        let radius_km = match body {
            Body::Mercury => MERCURY_RADIUS_KM,
            Body::Venus => VENUS_RADIUS_KM,
            other => {
                return UnsupportedBodySnafu {
                    body: other,
                    action: "searching a solar transit",
                }
                .fail()
            }
        };

        let mut search_time = start;
        // Mercury can go half a century between transits; a couple hundred
        // conjunctions bounds the walk far beyond that.
        for _ in 0..200 {
            let conj = self.search_relative_longitude(body, 0.0, search_time)?;
            let separation = self.angle_from_sun(body, conj)?;
            if separation < THRESHOLD_ANGLE {
                let shadow =
                    self.peak_shadow(|a, t| a.planet_shadow(body, radius_km, t), conj, 1.0)?;
                if shadow.r < shadow.p {
                    // The shadow axis sweeps the Earth: a genuine transit.
                    let contact = |direction: f64, t1: AstroTime, t2: AstroTime| {
                        search(
                            |t| {
                                let s = self.planet_shadow(body, radius_km, t)?;
                                Ok(direction * (s.r - s.p))
                            },
                            t1,
                            t2,
                            SearchOptions::with_tolerance_seconds(1.0),
                        )
                    };
                    let before = self.time_add_days(shadow.time, -CONTACT_WINDOW);
                    let after = self.time_add_days(shadow.time, CONTACT_WINDOW);
                    let begin = contact(-1.0, before, shadow.time)?.ok_or_else(|| {
                        SearchFailedSnafu {
                            action: "finding the transit ingress",
                        }
                        .build()
                    })?;
                    let finish = contact(1.0, shadow.time, after)?.ok_or_else(|| {
                        SearchFailedSnafu {
                            action: "finding the transit egress",
                        }
                        .build()
                    })?;
                    let separation = 60.0 * self.angle_from_sun(body, shadow.time)?;
                    return Ok(TransitInfo {
                        start: begin,
                        peak: shadow.time,
                        finish,
                        separation,
                    });
                }
            }
            debug!("conjunction at {conj} misses the solar disc, advancing");
            search_time = self.time_add_days(conj, 10.0);
        }
        NonConvergentSnafu {
            iter: 200usize,
            action: "walking inferior conjunctions for a transit",
        }
        .fail()
    }

    /// The transit after the one that peaked at `prev_time`.
    pub fn next_transit(&self, body: Body, prev_time: AstroTime) -> AlmagestResult<TransitInfo> {
        self.search_transit(body, self.time_add_days(prev_time, 100.0))
    }
}

#[cfg(test)]
mod ut_transits {
    use super::*;

    #[test]
    fn rejects_outer_planets() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac.search_transit(Body::Mars, t).is_err());
        assert!(almanac.search_transit(Body::Moon, t).is_err());
    }

    #[test]
    fn transit_of_mercury_2019() {
        // Mercury transited the Sun on 2019-11-11, peaking near 15:20 UT.
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2019, 9, 1, 0, 0, 0.0);
        let transit = almanac.search_transit(Body::Mercury, start).unwrap();
        let civil = transit.peak.to_civil();
        assert_eq!((civil.year, civil.month, civil.day), (2019, 11, 11));
        assert!(transit.start.ut < transit.peak.ut && transit.peak.ut < transit.finish.ut);
        // The whole event lasted about 5.5 hours.
        let hours = (transit.finish.ut - transit.start.ut) * 24.0;
        assert!(hours > 3.0 && hours < 8.0, "duration {hours} h");
        assert!(transit.separation < 16.0, "separation {}", transit.separation);
    }
}
