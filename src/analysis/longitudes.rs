/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Longitude-based event searches: lunar phases and nodes, equinoxes and
//! solstices, and relative-longitude conjunction plumbing.

use log::debug;
use snafu::ensure;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::constants::periods::EARTH_ORBITAL_PERIOD;
use crate::constants::MEAN_SYNODIC_MONTH;
use crate::ephemerides::Body;
use crate::errors::{
    AlmagestResult, DomainSnafu, InternalSnafu, NonConvergentSnafu, SearchFailedSnafu,
    UnsupportedBodySnafu,
};
use crate::frames::rotation_eqj_ecl;
use crate::math::angles::{between_0_360, between_pm_180};
use crate::math::vectors::spherical_from_vector;
use crate::time::AstroTime;

/// The sign of a node crossing doubles as the coefficient that turns the
/// latitude into an ascending scalar for [search].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeEventKind {
    Ascending,
    Descending,
}

impl NodeEventKind {
    pub fn sign(&self) -> f64 {
        match self {
            Self::Ascending => 1.0,
            Self::Descending => -1.0,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// A crossing of the Moon through the ecliptic plane.
#[derive(Copy, Clone, Debug)]
pub struct NodeEvent {
    pub kind: NodeEventKind,
    pub time: AstroTime,
}

/// One principal lunar phase.
#[derive(Copy, Clone, Debug)]
pub struct MoonQuarter {
    /// 0 = new moon, 1 = first quarter, 2 = full moon, 3 = third quarter.
    pub quarter: u8,
    pub time: AstroTime,
}

impl Almanac {
    /// Heliocentric ecliptic (J2000) longitude of a body, degrees [0, 360).
    pub fn helio_ecliptic_longitude(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        ensure!(
            body != Body::Sun,
            UnsupportedBodySnafu {
                body,
                action: "computing a heliocentric longitude of the Sun itself",
            }
        );
        let helio = self.helio_vector(body, time)?;
        let ecl = rotation_eqj_ecl().rotate(&helio);
        Ok(spherical_from_vector(&ecl)?.lon)
    }

    /// Apparent geocentric ecliptic-of-date longitude of `b1` minus that of
    /// `b2`, degrees [0, 360).
    pub fn pair_longitude(&self, b1: Body, b2: Body, time: AstroTime) -> AlmagestResult<f64> {
        let lon1 = self.ecliptic_longitude(b1, time)?;
        let lon2 = self.ecliptic_longitude(b2, time)?;
        Ok(between_0_360(lon1 - lon2))
    }

    /// The Moon's phase angle: its apparent ecliptic longitude minus the
    /// Sun's, degrees [0, 360). 0 is new moon, 180 full moon.
    pub fn moon_phase(&self, time: AstroTime) -> AlmagestResult<f64> {
        self.pair_longitude(Body::Moon, Body::Sun, time)
    }

    /// Finds the next time the Moon reaches `target_phase_deg` within
    /// `limit_days` after `start`.
    pub fn search_moon_phase(
        &self,
        target_phase_deg: f64,
        start: AstroTime,
        limit_days: f64,
    ) -> AlmagestResult<Option<AstroTime>> {
        ensure!(
            (0.0..360.0).contains(&target_phase_deg),
            DomainSnafu {
                msg: "moon phase target must be in [0, 360) degrees",
                value: target_phase_deg,
            }
        );
        // Estimate the event time from the synodic rate, then bracket it.
        let mut ya = between_pm_180(self.moon_phase(start)? - target_phase_deg);
        if ya > 0.0 {
            ya -= 360.0; // force the estimate into the future
        }
        let est_dt = -(MEAN_SYNODIC_MONTH * ya) / 360.0;
        let dt1 = (est_dt - 1.5).max(0.0);
        let dt2 = est_dt + 1.5;
        if dt1 > limit_days {
            return Ok(None);
        }
        let t1 = self.time_add_days(start, dt1);
        let t2 = self.time_add_days(start, dt2.min(limit_days));
        let result = search(
            |t| Ok(between_pm_180(self.moon_phase(t)? - target_phase_deg)),
            t1,
            t2,
            SearchOptions::with_tolerance_seconds(0.01),
        )?;
        Ok(result.filter(|t| t.ut - start.ut <= limit_days))
    }

    /// Finds the next principal lunar phase after `start`.
    pub fn search_moon_quarter(&self, start: AstroTime) -> AlmagestResult<MoonQuarter> {
        let angle = self.moon_phase(start)?;
        let quarter = ((1.0 + (angle / 90.0).floor()) as u8) % 4;
        let time = self
            .search_moon_phase(90.0 * f64::from(quarter), start, 10.0)?
            .ok_or_else(|| {
                SearchFailedSnafu {
                    action: "bracketing the next lunar quarter",
                }
                .build()
            })?;
        Ok(MoonQuarter { quarter, time })
    }

    /// The lunar quarter after `prev`.
    pub fn next_moon_quarter(&self, prev: &MoonQuarter) -> AlmagestResult<MoonQuarter> {
        let start = self.time_add_days(prev.time, 6.0);
        let next = self.search_moon_quarter(start)?;
        ensure!(
            next.quarter == (prev.quarter + 1) % 4,
            InternalSnafu {
                action: "sequencing lunar quarters",
            }
        );
        Ok(next)
    }

    /// Finds when the Sun's apparent ecliptic longitude reaches
    /// `target_lon_deg`, within `limit_days` after `start`. The scalar this
    /// searches ascends through zero only at the target, so equinoxes and
    /// solstices resolve cleanly.
    pub fn search_sun_longitude(
        &self,
        target_lon_deg: f64,
        start: AstroTime,
        limit_days: f64,
    ) -> AlmagestResult<Option<AstroTime>> {
        let t2 = self.time_add_days(start, limit_days);
        search(
            |t| {
                let lon = self.ecliptic_longitude(Body::Sun, t)?;
                Ok(between_pm_180(lon - target_lon_deg))
            },
            start,
            t2,
            SearchOptions::with_tolerance_seconds(0.01),
        )
    }

    /// The two equinoxes and two solstices of a calendar year.
    pub fn seasons(&self, year: i32) -> AlmagestResult<SeasonsInfo> {
        let find = |target: f64, month: i32| -> AlmagestResult<AstroTime> {
            let start = self.time_from_civil(&crate::time::CivilTime {
                year,
                month,
                day: 10,
                hour: 0,
                minute: 0,
                second: 0.0,
            });
            self.search_sun_longitude(target, start, 20.0)?.ok_or_else(|| {
                SearchFailedSnafu {
                    action: "bracketing a solstice or equinox",
                }
                .build()
            })
        };
        Ok(SeasonsInfo {
            march_equinox: find(0.0, 3)?,
            june_solstice: find(90.0, 6)?,
            september_equinox: find(180.0, 9)?,
            december_solstice: find(270.0, 12)?,
        })
    }

    /// Newton-like iteration for the time when the body-Earth relative
    /// heliocentric longitude reaches `target_rel_lon_deg`.
    ///
    /// Inferior conjunction is 0 for Mercury and Venus; opposition is 0 for
    /// the superior planets.
    pub fn search_relative_longitude(
        &self,
        body: Body,
        target_rel_lon_deg: f64,
        start: AstroTime,
    ) -> AlmagestResult<AstroTime> {
        let planet_period = match body {
            Body::Earth | Body::Sun | Body::Moon | Body::SSB | Body::EMB => {
                return UnsupportedBodySnafu {
                    body,
                    action: "searching a relative longitude",
                }
                .fail()
            }
            other => other.orbital_period().ok_or_else(|| {
                UnsupportedBodySnafu {
                    body,
                    action: "searching a relative longitude",
                }
                .build()
            })?,
        };
        // Earth laps the superior planets; the inferior planets lap Earth.
        let direction = if planet_period > EARTH_ORBITAL_PERIOD {
            1.0
        } else {
            -1.0
        };
        let mut syn = 1.0 / (1.0 / EARTH_ORBITAL_PERIOD - 1.0 / planet_period).abs();

        let offset = |t: AstroTime| -> AlmagestResult<f64> {
            let plon = self.helio_ecliptic_longitude(body, t)?;
            let elon = self.helio_ecliptic_longitude(Body::Earth, t)?;
            Ok(between_pm_180(
                direction * (elon - plon) - target_rel_lon_deg,
            ))
        };

        let mut error_angle = offset(start)?;
        if error_angle > 0.0 {
            error_angle -= 360.0; // seek forward in time only
        }
        let mut time = start;
        for iter in 0..100 {
            let day_adjust = (-error_angle / 360.0) * syn;
            time = self.time_add_days(time, day_adjust);
            if day_adjust.abs() * 86400.0 < 1.0 {
                debug!("relative longitude converged after {iter} iterations");
                return Ok(time);
            }
            let prev_angle = error_angle;
            error_angle = offset(time)?;
            if prev_angle.abs() < 30.0 && prev_angle != error_angle {
                // Improve the synodic estimate from the observed convergence
                // ratio.
                let ratio = prev_angle / (prev_angle - error_angle);
                if ratio > 0.5 && ratio < 2.0 {
                    syn *= ratio;
                }
            }
        }
        NonConvergentSnafu {
            iter: 100usize,
            action: "searching a relative longitude",
        }
        .fail()
    }

    /// Finds the next crossing of the Moon through the ecliptic plane at or
    /// after `start`.
    pub fn search_moon_node(&self, start: AstroTime) -> AlmagestResult<NodeEvent> {
        // Sample the latitude until the sign flips, then refine. Nodes are
        // 13.6 days apart, so 10-day sampling cannot skip one.
        let mut t1 = start;
        let mut lat1 = self.ecliptic_geo_moon(t1).geo_eclip_lat;
        for _ in 0..100 {
            let t2 = self.time_add_days(t1, 10.0);
            let lat2 = self.ecliptic_geo_moon(t2).geo_eclip_lat;
            if lat1 * lat2 <= 0.0 && lat2 != lat1 {
                let kind = if lat2 > lat1 {
                    NodeEventKind::Ascending
                } else {
                    NodeEventKind::Descending
                };
                let time = search(
                    |t| Ok(kind.sign() * self.ecliptic_geo_moon(t).geo_eclip_lat),
                    t1,
                    t2,
                    SearchOptions::with_tolerance_seconds(1.0),
                )?
                .ok_or_else(|| {
                    SearchFailedSnafu {
                        action: "refining a lunar node crossing",
                    }
                    .build()
                })?;
                return Ok(NodeEvent { kind, time });
            }
            t1 = t2;
            lat1 = lat2;
        }
        NonConvergentSnafu {
            iter: 100usize,
            action: "sampling for a lunar node",
        }
        .fail()
    }

    /// The node crossing after `prev`; alternation is enforced.
    pub fn next_moon_node(&self, prev: &NodeEvent) -> AlmagestResult<NodeEvent> {
        let start = self.time_add_days(prev.time, 10.0);
        let next = self.search_moon_node(start)?;
        ensure!(
            next.kind == prev.kind.opposite(),
            InternalSnafu {
                action: "sequencing lunar nodes",
            }
        );
        Ok(next)
    }
}

/// The four cardinal solar events of a year.
#[derive(Copy, Clone, Debug)]
pub struct SeasonsInfo {
    pub march_equinox: AstroTime,
    pub june_solstice: AstroTime,
    pub september_equinox: AstroTime,
    pub december_solstice: AstroTime,
}

#[cfg(test)]
mod ut_longitudes {
    use super::*;

    #[test]
    fn moon_phase_range() {
        let almanac = Almanac::new();
        for i in 0..40 {
            let t = AstroTime::from_ut(f64::from(i) * 3.3);
            let phase = almanac.moon_phase(t).unwrap();
            assert!((0.0..360.0).contains(&phase));
        }
    }

    #[test]
    fn quarters_sequence() {
        let almanac = Almanac::new();
        let start = AstroTime::from_civil(2019, 6, 1, 0, 0, 0.0);
        let q0 = almanac.search_moon_quarter(start).unwrap();
        let mut prev = q0;
        for _ in 0..8 {
            let next = almanac.next_moon_quarter(&prev).unwrap();
            // Quarters are roughly a week apart.
            let gap = next.time.ut - prev.time.ut;
            assert!(gap > 5.5 && gap < 9.5, "gap {gap}");
            prev = next;
        }
    }

    #[test]
    fn node_alternation() {
        let almanac = Almanac::new();
        let first = almanac
            .search_moon_node(AstroTime::from_civil(2007, 1, 1, 0, 0, 0.0))
            .unwrap();
        let mut prev = first;
        for _ in 0..6 {
            let next = almanac.next_moon_node(&prev).unwrap();
            assert_eq!(next.kind, prev.kind.opposite());
            let gap = next.time.ut - prev.time.ut;
            assert!(gap > 11.0 && gap < 16.5, "node gap {gap}");
            // Latitude at the node is tiny.
            let lat = almanac.ecliptic_geo_moon(next.time).geo_eclip_lat;
            assert!(lat.abs() < 0.01, "node latitude {lat}");
            prev = next;
        }
    }

    #[test]
    fn rejects_bad_phase_target() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac.search_moon_phase(360.0, t, 40.0).is_err());
        assert!(almanac.search_moon_phase(-0.1, t, 40.0).is_err());
    }

    #[test]
    fn relative_longitude_rejects_earth() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac.search_relative_longitude(Body::Earth, 0.0, t).is_err());
        assert!(almanac.search_relative_longitude(Body::Moon, 0.0, t).is_err());
    }
}
