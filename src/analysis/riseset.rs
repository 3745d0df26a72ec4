/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Rise, set, twilight-altitude and hour-angle searches.

use snafu::ensure;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::astro::Horizontal;
use crate::constants::{
    DEG2RAD, EARTH_MEAN_RADIUS_KM, KM_PER_AU, MOON_EQUATORIAL_RADIUS_KM, RAD2DEG,
    REFRACTION_NEAR_HORIZON, SOLAR_DAYS_PER_SIDEREAL_DAY, SUN_RADIUS_KM,
};
use crate::ephemerides::Body;
use crate::errors::{AlmagestResult, DomainSnafu, NonConvergentSnafu};
use crate::observers::{atmosphere, Observer, Refraction};
use crate::orientations::sidereal_time;
use crate::time::AstroTime;

/// Direction of a horizon crossing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrossingDirection {
    Rise,
    Set,
}

impl CrossingDirection {
    fn sign(&self) -> f64 {
        match self {
            Self::Rise => 1.0,
            Self::Set => -1.0,
        }
    }
}

/// Result of an hour-angle search: the time and where the body then stands.
#[derive(Copy, Clone, Debug)]
pub struct HourAngleInfo {
    pub time: AstroTime,
    pub hor: Horizontal,
}

/// Windows advance by this step; safely under half of the shortest
/// altitude period (about 22 hours at high latitudes).
const RISE_SET_DT: f64 = 0.42;

/// The steepest possible altitude rate for the body at this latitude, in
/// degrees per day. The RA/Dec rate extremes are per-body constants; bodies
/// outside the table move slowly enough for the default.
fn max_altitude_slope(body: Body, latitude_deg: f64) -> f64 {
    let (deriv_ra, deriv_dec): (f64, f64) = match body {
        Body::Moon => (4.5, 8.2),
        Body::Sun => (0.8, 0.5),
        Body::Mercury => (-1.6, 1.0),
        Body::Venus => (-0.8, 0.6),
        Body::Mars => (-0.5, 0.4),
        _ => (-0.2, 0.2),
    };
    let latrad = latitude_deg * DEG2RAD;
    ((360.0 / SOLAR_DAYS_PER_SIDEREAL_DAY - deriv_ra) * latrad.cos()).abs() + deriv_dec.abs()
}

/// Recursive bisection for a subinterval that brackets an ascending zero of
/// the altitude-difference function. Prunes halves where the midpoint value
/// is too far from zero to be reachable at the body's maximum altitude rate.
fn find_ascent<F>(
    depth: usize,
    altdiff: &mut F,
    max_deriv_alt: f64,
    t1: AstroTime,
    t2: AstroTime,
    a1: f64,
    a2: f64,
) -> AlmagestResult<Option<(AstroTime, AstroTime, f64, f64)>>
where
    F: FnMut(AstroTime) -> AlmagestResult<f64>,
{
    if a1 < 0.0 && a2 >= 0.0 {
        return Ok(Some((t1, t2, a1, a2)));
    }
    if a1 >= 0.0 && a2 < 0.0 {
        // Descending crossing only.
        return Ok(None);
    }
    if depth > 17 {
        return Ok(None);
    }
    let dt = t2.ut - t1.ut;
    if dt * 86400.0 < 1.0 {
        return Ok(None);
    }
    let tmid = AstroTime::interpolate(t1, t2, 0.5);
    let amid = altdiff(tmid)?;
    if amid.abs() > max_deriv_alt * (dt / 2.0) {
        // Cannot swing through zero and back inside this window.
        return Ok(None);
    }
    if let Some(found) = find_ascent(depth + 1, altdiff, max_deriv_alt, t1, tmid, a1, amid)? {
        return Ok(Some(found));
    }
    find_ascent(depth + 1, altdiff, max_deriv_alt, tmid, t2, amid, a2)
}

impl Almanac {
    fn internal_search_altitude(
        &self,
        body: Body,
        observer: &Observer,
        direction: CrossingDirection,
        start: AstroTime,
        limit_days: f64,
        body_radius_au: f64,
        target_altitude: f64,
    ) -> AlmagestResult<Option<AstroTime>> {
        let max_deriv_alt = max_altitude_slope(body, observer.latitude);
        let mut altdiff = |time: AstroTime| -> AlmagestResult<f64> {
            let ofdate = self.equator(body, time, observer, true, true)?;
            let hor = self.horizontal(time, observer, ofdate.ra, ofdate.dec, Refraction::None);
            let altitude = hor.altitude + RAD2DEG * (body_radius_au / ofdate.dist).asin();
            Ok(direction.sign() * (altitude - target_altitude))
        };

        let stop = start.ut + limit_days;
        let mut t1 = start;
        let mut a1 = altdiff(t1)?;
        while t1.ut < stop {
            let t2 = self.time_add_days(t1, RISE_SET_DT);
            let a2 = altdiff(t2)?;
            if let Some((bt1, bt2, ba1, ba2)) =
                find_ascent(0, &mut altdiff, max_deriv_alt, t1, t2, a1, a2)?
            {
                let found = search(
                    &mut altdiff,
                    bt1,
                    bt2,
                    SearchOptions {
                        dt_tolerance_seconds: 0.1,
                        init_f1: Some(ba1),
                        init_f2: Some(ba2),
                        ..SearchOptions::default()
                    },
                )?;
                if let Some(time) = found {
                    if time.ut <= stop {
                        return Ok(Some(time));
                    }
                    return Ok(None);
                }
            }
            t1 = t2;
            a1 = a2;
        }
        Ok(None)
    }

    /// Finds the next rise or set of a body for the observer, within
    /// `limit_days` of `start`.
    ///
    /// The crossing is that of the body's upper limb through the apparent
    /// horizon: the altitude target folds in the horizon dip for
    /// `meters_above_ground` and standard refraction scaled by the
    /// atmospheric density at the ground elevation. Returns `Ok(None)` if
    /// the body does not cross inside the window (polar day or night).
    pub fn search_rise_set(
        &self,
        body: Body,
        observer: &Observer,
        direction: CrossingDirection,
        start: AstroTime,
        limit_days: f64,
        meters_above_ground: f64,
    ) -> AlmagestResult<Option<AstroTime>> {
        ensure!(
            meters_above_ground.is_finite() && meters_above_ground >= 0.0,
            DomainSnafu {
                msg: "meters above ground must be non-negative",
                value: meters_above_ground,
            }
        );
        let body_radius_au = match body {
            Body::Sun => SUN_RADIUS_KM / KM_PER_AU,
            Body::Moon => MOON_EQUATORIAL_RADIUS_KM / KM_PER_AU,
            _ => 0.0,
        };
        // Refraction weakens with the air density at the ground, and an
        // elevated observer sees a dipped horizon.
        let atmos = atmosphere(observer.height - meters_above_ground)?;
        let dip = -RAD2DEG * (2.0 * meters_above_ground / (EARTH_MEAN_RADIUS_KM * 1000.0)).sqrt();
        let target_altitude = dip - REFRACTION_NEAR_HORIZON * atmos.density;
        self.internal_search_altitude(
            body,
            observer,
            direction,
            start,
            limit_days,
            body_radius_au,
            target_altitude,
        )
    }

    /// Finds when the center of a body crosses a given true altitude, with no
    /// refraction or radius correction; the usual tool for twilight events at
    /// -6, -12 or -18 degrees.
    pub fn search_altitude(
        &self,
        body: Body,
        observer: &Observer,
        direction: CrossingDirection,
        start: AstroTime,
        limit_days: f64,
        altitude_deg: f64,
    ) -> AlmagestResult<Option<AstroTime>> {
        ensure!(
            (-90.0..=90.0).contains(&altitude_deg),
            DomainSnafu {
                msg: "target altitude must be in [-90, 90] degrees",
                value: altitude_deg,
            }
        );
        self.internal_search_altitude(body, observer, direction, start, limit_days, 0.0, altitude_deg)
    }

    /// Finds when a body reaches the given hour angle for the observer, by
    /// sidereal-rate correction steps.
    ///
    /// `direction` selects the first event after (+1) or before (-1) `start`.
    pub fn search_hour_angle(
        &self,
        body: Body,
        observer: &Observer,
        hour_angle: f64,
        start: AstroTime,
        direction: i32,
    ) -> AlmagestResult<HourAngleInfo> {
        ensure!(
            (0.0..24.0).contains(&hour_angle),
            DomainSnafu {
                msg: "hour angle must be in [0, 24) sidereal hours",
                value: hour_angle,
            }
        );
        ensure!(
            direction == 1 || direction == -1,
            DomainSnafu {
                msg: "hour angle search direction must be +1 or -1",
                value: f64::from(direction),
            }
        );
        let mut time = start;
        for iter in 1..=100 {
            let gast = sidereal_time(time);
            let ofdate = self.equator(body, time, observer, true, true)?;
            let mut delta_sidereal_hours =
                ((hour_angle + ofdate.ra - observer.longitude / 15.0) - gast).rem_euclid(24.0);
            if iter == 1 {
                // First pass: push the full cycle into the requested time
                // direction.
                if direction > 0 && delta_sidereal_hours < 0.0 {
                    delta_sidereal_hours += 24.0;
                } else if direction < 0 && delta_sidereal_hours > 0.0 {
                    delta_sidereal_hours -= 24.0;
                }
            } else {
                // Later passes: take the shortest signed adjustment.
                if delta_sidereal_hours > 12.0 {
                    delta_sidereal_hours -= 24.0;
                }
            }
            if delta_sidereal_hours.abs() * 3600.0 < 0.1 {
                let hor =
                    self.horizontal(time, observer, ofdate.ra, ofdate.dec, Refraction::Normal);
                return Ok(HourAngleInfo { time, hor });
            }
            time = self.time_add_days(
                time,
                (delta_sidereal_hours / 24.0) * SOLAR_DAYS_PER_SIDEREAL_DAY,
            );
        }
        NonConvergentSnafu {
            iter: 100usize,
            action: "searching for an hour angle",
        }
        .fail()
    }
}

#[cfg(test)]
mod ut_riseset {
    use super::*;

    #[test]
    fn sun_rises_and_sets_daily_at_midlatitude() {
        let almanac = Almanac::new();
        let observer = Observer::new(40.0, -74.0, 0.0).unwrap();
        let start = AstroTime::from_civil(2023, 3, 1, 0, 0, 0.0);
        let rise = almanac
            .search_rise_set(Body::Sun, &observer, CrossingDirection::Rise, start, 1.2, 0.0)
            .unwrap()
            .expect("sun must rise");
        let set = almanac
            .search_rise_set(Body::Sun, &observer, CrossingDirection::Set, start, 1.2, 0.0)
            .unwrap()
            .expect("sun must set");
        assert!(rise.ut > start.ut && rise.ut < start.ut + 1.2);
        assert!(set.ut > start.ut && set.ut < start.ut + 1.2);
        // Early March: days are under 12 hours at 40N.
        let daylen = if set.ut > rise.ut {
            set.ut - rise.ut
        } else {
            rise.ut - set.ut
        };
        assert!(daylen < 0.55, "day length {daylen}");
    }

    #[test]
    fn polar_night_returns_none() {
        let almanac = Almanac::new();
        // Deep winter well above the arctic circle: no sunrise.
        let observer = Observer::new(80.0, 0.0, 0.0).unwrap();
        let start = AstroTime::from_civil(2022, 12, 20, 0, 0, 0.0);
        let rise = almanac
            .search_rise_set(Body::Sun, &observer, CrossingDirection::Rise, start, 5.0, 0.0)
            .unwrap();
        assert!(rise.is_none());
    }

    #[test]
    fn altitude_search_finds_twilight() {
        let almanac = Almanac::new();
        let observer = Observer::new(40.0, -74.0, 0.0).unwrap();
        let start = AstroTime::from_civil(2023, 6, 21, 0, 0, 0.0);
        let dawn = almanac
            .search_altitude(
                Body::Sun,
                &observer,
                CrossingDirection::Rise,
                start,
                1.0,
                -6.0,
            )
            .unwrap()
            .expect("civil dawn exists at 40N in June");
        let rise = almanac
            .search_rise_set(Body::Sun, &observer, CrossingDirection::Rise, start, 1.0, 0.0)
            .unwrap()
            .unwrap();
        assert!(dawn.ut < rise.ut, "dawn precedes sunrise");
        assert!(rise.ut - dawn.ut < 0.05, "under about an hour apart");
    }

    #[test]
    fn hour_angle_zero_is_transit() {
        let almanac = Almanac::new();
        let observer = Observer::new(35.0, 139.0, 0.0).unwrap();
        let start = AstroTime::from_civil(2021, 10, 1, 0, 0, 0.0);
        let info = almanac
            .search_hour_angle(Body::Sun, &observer, 0.0, start, 1)
            .unwrap();
        // At transit the Sun is due south (or north) and at its daily peak.
        assert!(info.hor.altitude > 30.0, "transit altitude {}", info.hor.altitude);
        assert!(info.time.ut >= start.ut && info.time.ut < start.ut + 1.1);
    }

    #[test]
    fn rejects_bad_arguments() {
        let almanac = Almanac::new();
        let observer = Observer::new(0.0, 0.0, 0.0).unwrap();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac
            .search_rise_set(Body::Sun, &observer, CrossingDirection::Rise, t, 1.0, -5.0)
            .is_err());
        assert!(almanac
            .search_hour_angle(Body::Sun, &observer, 24.0, t, 1)
            .is_err());
        assert!(almanac
            .search_hour_angle(Body::Sun, &observer, 1.0, t, 0)
            .is_err());
    }
}
