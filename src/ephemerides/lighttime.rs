/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Light-travel-time correction and stellar aberration.

use snafu::ensure;

use super::{time_shift, Body};
use crate::almanac::Almanac;
use crate::constants::C_AUDAY;
use crate::errors::{AlmagestResult, DomainSnafu, NonConvergentSnafu};
use crate::math::vectors::AstroVector;
use crate::time::AstroTime;

/// Solves for the apparent position of a moving target by fixed-point
/// iteration on the emission time: each pass evaluates `func` at the current
/// backdated time and shortens the light delay until it settles below one
/// nanodays (about 86 microseconds).
///
/// # Errors
/// - `Domain` if the target is farther than one light-day;
/// - `NonConvergent` after 10 iterations.
pub fn correct_light_travel<F>(mut func: F, time: AstroTime) -> AlmagestResult<AstroVector>
where
    F: FnMut(AstroTime) -> AlmagestResult<AstroVector>,
{
    let mut ltime = time;
    for _ in 0..10 {
        let vec = func(ltime)?;
        let lt_days = vec.length() / C_AUDAY;
        ensure!(
            lt_days < 1.0,
            DomainSnafu {
                msg: "light-travel correction requires a distance under one light-day",
                value: lt_days,
            }
        );
        let ltime2 = time_shift(time, -lt_days);
        if (ltime2.tt - ltime.tt).abs() < 1.0e-9 {
            return Ok(vec);
        }
        ltime = ltime2;
    }
    NonConvergentSnafu {
        iter: 10usize,
        action: "iterating the light-travel time",
    }
    .fail()
}

impl Almanac {
    /// Apparent position of `target_body` relative to `observer_body` at
    /// `time`, corrected for light travel and optionally for aberration.
    ///
    /// For a user star the heliocentric direction is time-invariant, so only
    /// the observer moves; aberration then shifts the relative vector along
    /// the observer's velocity by the light-travel time. For all other
    /// bodies the emission time is solved by [correct_light_travel]; with
    /// aberration enabled the observer is re-evaluated at each backdated
    /// time, which is the physically consistent treatment of aberration
    /// combined with light delay.
    pub fn backdate_position(
        &self,
        time: AstroTime,
        observer_body: Body,
        target_body: Body,
        aberration: bool,
    ) -> AlmagestResult<AstroVector> {
        if target_body.is_user_star() {
            let star = self.helio_vector(target_body, time)?;
            let observer = self.helio_state(observer_body, time)?;
            let mut rel = star.pos - observer.pos;
            if aberration {
                rel += observer.vel * (rel.norm() / C_AUDAY);
            }
            return Ok(AstroVector::from_vector3(rel, time));
        }

        if aberration {
            // The observer's own position is re-evaluated at the backdated
            // time inside the iteration.
            correct_light_travel(
                |t| {
                    let target = self.helio_vector(target_body, t)?;
                    let observer = self.helio_vector(observer_body, t)?;
                    Ok(AstroVector::from_vector3(target.pos - observer.pos, t))
                },
                time,
            )
        } else {
            let observer = self.helio_vector(observer_body, time)?;
            correct_light_travel(
                |t| {
                    let target = self.helio_vector(target_body, t)?;
                    Ok(AstroVector::from_vector3(target.pos - observer.pos, t))
                },
                time,
            )
        }
    }

    /// Geocentric position of a body, corrected for light travel and
    /// optionally aberration. The returned vector is stamped with the
    /// observation time, not the backdated emission time.
    pub fn geo_vector(
        &self,
        body: Body,
        time: AstroTime,
        aberration: bool,
    ) -> AlmagestResult<AstroVector> {
        match body {
            // The lunar theory is already geocentric.
            Body::Moon => Ok(self.geo_moon(time)),
            Body::Earth => Ok(AstroVector::new(0.0, 0.0, 0.0, time)),
            _ => Ok(self
                .backdate_position(time, Body::Earth, body, aberration)?
                .with_time(time)),
        }
    }
}

#[cfg(test)]
mod ut_lighttime {
    use super::*;

    #[test]
    fn sun_light_time_is_about_500_seconds() {
        let almanac = Almanac::new();
        let time = AstroTime::from_ut(100.0);
        let uncorrected = almanac.helio_vector(Body::Earth, time).unwrap();
        let mut seen_time = time;
        let corrected = correct_light_travel(
            |t| {
                seen_time = t;
                Ok(-almanac.helio_vector(Body::Earth, t).unwrap())
            },
            time,
        )
        .unwrap();
        let delay_seconds = (time.tt - seen_time.tt) * 86400.0;
        assert!((delay_seconds - 499.0).abs() < 10.0, "delay {delay_seconds}");
        // The Sun barely moves in 500 s; the correction shifts by under 1e-5 au.
        assert!((corrected.pos + uncorrected.pos).norm() < 1.0e-4);
    }

    #[test]
    fn aberration_shifts_by_about_20_arcsec() {
        let almanac = Almanac::new();
        let time = AstroTime::from_ut(2500.0);
        let plain = almanac.geo_vector(Body::Mars, time, false).unwrap();
        let apparent = almanac.geo_vector(Body::Mars, time, true).unwrap();
        let angle = crate::math::angle_between(&plain.pos, &apparent.pos) * 3600.0;
        // Annual aberration is at most ~20.5 arcsec, and Mars is near the
        // ecliptic, so expect a shift between 0 and 41 arcsec.
        assert!(angle < 45.0, "aberration shift {angle} arcsec");
        assert!(angle > 0.1, "aberration shift {angle} arcsec");
    }

    #[test]
    fn geo_vector_keeps_observation_time() {
        let almanac = Almanac::new();
        let time = AstroTime::from_ut(-5000.0);
        let v = almanac.geo_vector(Body::Jupiter, time, true).unwrap();
        assert_eq!(v.time, time);
    }
}
