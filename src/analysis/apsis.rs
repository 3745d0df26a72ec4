/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Perihelion/aphelion and perigee/apogee searches.

use snafu::ensure;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::constants::KM_PER_AU;
use crate::ephemerides::Body;
use crate::errors::{
    AlmagestResult, InternalSnafu, NonConvergentSnafu, SearchFailedSnafu, UnsupportedBodySnafu,
};
use crate::time::AstroTime;

/// Closest or farthest point of an orbit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApsisKind {
    /// Perihelion or perigee.
    Pericenter,
    /// Aphelion or apogee.
    Apocenter,
}

impl ApsisKind {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Pericenter => Self::Apocenter,
            Self::Apocenter => Self::Pericenter,
        }
    }
}

/// An apsis event.
#[derive(Copy, Clone, Debug)]
pub struct ApsisEvent {
    pub kind: ApsisKind,
    pub time: AstroTime,
    /// Distance from the primary in AU.
    pub dist_au: f64,
}

impl ApsisEvent {
    pub fn dist_km(&self) -> f64 {
        self.dist_au * KM_PER_AU
    }
}

/// Mean anomalistic month in days; spaces the lunar apsis brackets.
const MEAN_ANOMALISTIC_MONTH: f64 = 27.554_55;

impl Almanac {
    /// Numerical d|r|/dt of the heliocentric distance, per day.
    fn helio_distance_slope(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        let dt = 0.001;
        let before = self.helio_distance(body, self.time_add_days(time, -dt / 2.0))?;
        let after = self.helio_distance(body, self.time_add_days(time, dt / 2.0))?;
        Ok((after - before) / dt)
    }

    /// Finds the next perihelion or aphelion of a planet after `start`.
    ///
    /// The slope method steps sixth-of-an-orbit intervals until the distance
    /// slope changes sign, then refines. Neptune and Pluto get the
    /// brute-force sampling treatment: their distance slope is too noisy for
    /// bracketing (Neptune's orbit is nearly circular, and Pluto's is
    /// perturbation-dominated).
    pub fn search_planet_apsis(&self, body: Body, start: AstroTime) -> AlmagestResult<ApsisEvent> {
        if body == Body::Neptune || body == Body::Pluto {
            return self.brute_search_planet_apsis(body, start);
        }
        let period = body.orbital_period().ok_or_else(|| {
            UnsupportedBodySnafu {
                body,
                action: "searching a planet apsis",
            }
            .build()
        })?;
        ensure!(
            body != Body::Earth && body != Body::EMB,
            UnsupportedBodySnafu {
                body,
                action: "searching a planet apsis of the observer's own orbit",
            }
        );

        let interval = period / 6.0;
        let mut t1 = start;
        let mut m1 = self.helio_distance_slope(body, t1)?;
        for _ in 0..10 {
            let t2 = self.time_add_days(t1, interval);
            let m2 = self.helio_distance_slope(body, t2)?;
            if m1 * m2 <= 0.0 {
                // Sign change: this interval brackets an apsis.
                let kind = if m1 < 0.0 || m2 > 0.0 {
                    ApsisKind::Pericenter
                } else {
                    ApsisKind::Apocenter
                };
                let sign = match kind {
                    ApsisKind::Pericenter => 1.0,
                    ApsisKind::Apocenter => -1.0,
                };
                let time = search(
                    |t| Ok(sign * self.helio_distance_slope(body, t)?),
                    t1,
                    t2,
                    SearchOptions::with_tolerance_seconds(1.0),
                )?
                .ok_or_else(|| {
                    SearchFailedSnafu {
                        action: "refining a bracketed apsis",
                    }
                    .build()
                })?;
                let dist_au = self.helio_distance(body, time)?;
                return Ok(ApsisEvent {
                    kind,
                    time,
                    dist_au,
                });
            }
            t1 = t2;
            m1 = m2;
        }
        NonConvergentSnafu {
            iter: 10usize,
            action: "bracketing a planet apsis",
        }
        .fail()
    }

    /// The apsis after `prev`, which must alternate in kind.
    pub fn next_planet_apsis(&self, body: Body, prev: &ApsisEvent) -> AlmagestResult<ApsisEvent> {
        let period = body.orbital_period().ok_or_else(|| {
            UnsupportedBodySnafu {
                body,
                action: "searching the next planet apsis",
            }
            .build()
        })?;
        let start = self.time_add_days(prev.time, period / 4.0);
        let next = self.search_planet_apsis(body, start)?;
        ensure!(
            next.kind == prev.kind.opposite(),
            InternalSnafu {
                action: "sequencing planet apsides",
            }
        );
        Ok(next)
    }

    /// Brute-force apsis search for near-circular or perturbation-dominated
    /// orbits: sample an orbital arc, take the extremes, narrow each.
    fn brute_search_planet_apsis(
        &self,
        body: Body,
        start: AstroTime,
    ) -> AlmagestResult<ApsisEvent> {
        const NPOINTS: usize = 100;
        let period = body.orbital_period().ok_or_else(|| {
            UnsupportedBodySnafu {
                body,
                action: "searching a planet apsis",
            }
            .build()
        })?;
        let t1 = self.time_add_days(start, period * (-30.0 / 360.0));
        let t2 = self.time_add_days(start, period * (270.0 / 360.0));
        let t_min = self.planet_extreme(body, ApsisKind::Pericenter, t1, t2.ut - t1.ut, NPOINTS)?;
        let t_max = self.planet_extreme(body, ApsisKind::Apocenter, t1, t2.ut - t1.ut, NPOINTS)?;

        // Whichever extreme falls first after the start wins.
        let mut candidates = [
            (ApsisKind::Pericenter, t_min),
            (ApsisKind::Apocenter, t_max),
        ];
        candidates.sort_by(|a, b| a.1.ut.total_cmp(&b.1.ut));
        for (kind, time) in candidates {
            if time.ut >= start.ut {
                let dist_au = self.helio_distance(body, time)?;
                return Ok(ApsisEvent {
                    kind,
                    time,
                    dist_au,
                });
            }
        }
        InternalSnafu {
            action: "selecting a brute-force apsis candidate",
        }
        .fail()
    }

    /// Iteratively narrows a sampled distance extreme until the window is
    /// under one minute wide.
    fn planet_extreme(
        &self,
        body: Body,
        kind: ApsisKind,
        mut t_start: AstroTime,
        mut dt_total: f64,
        initial_npoints: usize,
    ) -> AlmagestResult<AstroTime> {
        let mut npoints = initial_npoints;
        loop {
            if dt_total < 1.0 / 1440.0 {
                return Ok(self.time_add_days(t_start, dt_total / 2.0));
            }
            let interval = dt_total / ((npoints - 1) as f64);
            let mut best_i = 0;
            let mut best_dist = self.helio_distance(body, t_start)?;
            for i in 1..npoints {
                let t = self.time_add_days(t_start, interval * i as f64);
                let dist = self.helio_distance(body, t)?;
                let better = match kind {
                    ApsisKind::Pericenter => dist < best_dist,
                    ApsisKind::Apocenter => dist > best_dist,
                };
                if better {
                    best_i = i;
                    best_dist = dist;
                }
            }
            t_start = self.time_add_days(t_start, interval * (best_i as f64 - 1.0));
            dt_total = 2.0 * interval;
            npoints = 10;
        }
    }

    /// Finds the next lunar perigee or apogee after `start`, by the same
    /// distance-slope bracketing as the planets, on the geocentric distance.
    pub fn search_lunar_apsis(&self, start: AstroTime) -> AlmagestResult<ApsisEvent> {
        let slope = |t: AstroTime| -> AlmagestResult<f64> {
            let dt = 0.001;
            let before = self
                .ecliptic_geo_moon(self.time_add_days(t, -dt / 2.0))
                .distance_au;
            let after = self
                .ecliptic_geo_moon(self.time_add_days(t, dt / 2.0))
                .distance_au;
            Ok((after - before) / dt)
        };
        let interval = MEAN_ANOMALISTIC_MONTH / 6.0;
        let mut t1 = start;
        let mut m1 = slope(t1)?;
        for _ in 0..10 {
            let t2 = self.time_add_days(t1, interval);
            let m2 = slope(t2)?;
            if m1 * m2 <= 0.0 {
                let kind = if m1 < 0.0 || m2 > 0.0 {
                    ApsisKind::Pericenter
                } else {
                    ApsisKind::Apocenter
                };
                let sign = match kind {
                    ApsisKind::Pericenter => 1.0,
                    ApsisKind::Apocenter => -1.0,
                };
                let time = search(
                    |t| Ok(sign * slope(t)?),
                    t1,
                    t2,
                    SearchOptions::with_tolerance_seconds(1.0),
                )?
                .ok_or_else(|| {
                    SearchFailedSnafu {
                        action: "refining a bracketed lunar apsis",
                    }
                    .build()
                })?;
                let dist_au = self.ecliptic_geo_moon(time).distance_au;
                return Ok(ApsisEvent {
                    kind,
                    time,
                    dist_au,
                });
            }
            t1 = t2;
            m1 = m2;
        }
        NonConvergentSnafu {
            iter: 10usize,
            action: "bracketing a lunar apsis",
        }
        .fail()
    }

    /// The lunar apsis after `prev`; alternation is enforced.
    pub fn next_lunar_apsis(&self, prev: &ApsisEvent) -> AlmagestResult<ApsisEvent> {
        let start = self.time_add_days(prev.time, MEAN_ANOMALISTIC_MONTH / 4.0);
        let next = self.search_lunar_apsis(start)?;
        ensure!(
            next.kind == prev.kind.opposite(),
            InternalSnafu {
                action: "sequencing lunar apsides",
            }
        );
        Ok(next)
    }
}

#[cfg(test)]
mod ut_apsis {
    use super::*;

    #[test]
    fn mercury_apsis_distances() {
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2020, 1, 1, 0, 0, 0.0);
        let first = almanac.search_planet_apsis(Body::Mercury, start).unwrap();
        let second = almanac.next_planet_apsis(Body::Mercury, &first).unwrap();
        let (peri, aph) = match first.kind {
            ApsisKind::Pericenter => (first, second),
            ApsisKind::Apocenter => (second, first),
        };
        assert!((peri.dist_au - 0.3075).abs() < 0.002, "perihelion {}", peri.dist_au);
        assert!((aph.dist_au - 0.4667).abs() < 0.002, "aphelion {}", aph.dist_au);
        // Half an orbit apart.
        let gap = (aph.time.ut - peri.time.ut).abs();
        assert!((gap - 44.0).abs() < 4.0, "gap {gap}");
    }

    #[test]
    fn lunar_apsis_cycle() {
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2000, 1, 1, 0, 0, 0.0);
        let first = almanac.search_lunar_apsis(start).unwrap();
        let mut prev = first;
        for _ in 0..4 {
            let next = almanac.next_lunar_apsis(&prev).unwrap();
            assert_eq!(next.kind, prev.kind.opposite());
            let gap = next.time.ut - prev.time.ut;
            assert!(gap > 11.0 && gap < 17.0, "apsis gap {gap}");
            match next.kind {
                ApsisKind::Pericenter => assert!(next.dist_km() < 371_000.0),
                ApsisKind::Apocenter => assert!(next.dist_km() > 400_000.0),
            }
            prev = next;
        }
    }

    #[test]
    fn neptune_uses_brute_force() {
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2000, 1, 1, 0, 0, 0.0);
        let apsis = almanac.search_planet_apsis(Body::Neptune, start).unwrap();
        assert!(apsis.time.ut >= start.ut);
        assert!(apsis.dist_au > 29.0 && apsis.dist_au < 31.0);
    }

    #[test]
    fn rejects_earth() {
        let almanac = Almanac::new();
        let start = AstroTime::from_ut(0.0);
        assert!(almanac.search_planet_apsis(Body::Earth, start).is_err());
        assert!(almanac.search_planet_apsis(Body::Moon, start).is_err());
    }
}
