/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use core::cmp::Ordering;
use core::fmt;

mod deltat;
pub use deltat::{delta_t_espenak_meeus, DeltaT};

/// A calendar date and time, interpreted as UTC.
///
/// This struct is the only boundary between this crate and any external
/// date/time system. There is no leap-second accounting beyond ΔT.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CivilTime {
    pub year: i32,
    /// 1..=12
    pub month: i32,
    /// 1..=31
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: f64,
}

/// A moment in time, tracked on both the UT and TT scales as days since the
/// J2000 epoch (2000-01-01 12:00 TT).
///
/// Invariant: `tt = ut + ΔT(ut) / 86400` under the model that minted this
/// value. Immutable; [AstroTime::add_days] returns a new value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AstroTime {
    /// Days since J2000, measured in Universal Time.
    pub ut: f64,
    /// Days since J2000, measured in Terrestrial Time.
    pub tt: f64,
}

impl AstroTime {
    /// Builds a time from a raw UT day offset using the default
    /// Espenak-Meeus ΔT model. [crate::almanac::Almanac::time_from_ut]
    /// honors the engine-configured model instead.
    pub fn from_ut(ut: f64) -> Self {
        Self::from_ut_with(ut, DeltaT::EspenakMeeus)
    }

    pub(crate) fn from_ut_with(ut: f64, model: DeltaT) -> Self {
        Self {
            ut,
            tt: ut + model.seconds(ut) / 86400.0,
        }
    }

    /// Builds a time from a civil UTC date/time using the default
    /// Espenak-Meeus ΔT model.
    pub fn from_civil(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: f64) -> Self {
        Self::from_ut(ut_from_civil(&CivilTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }))
    }

    pub fn from_civil_time(ct: &CivilTime) -> Self {
        Self::from_ut(ut_from_civil(ct))
    }

    /// Returns a new time `days` later (or earlier when negative), with TT
    /// recomputed from the ΔT model so the UT/TT invariant is preserved.
    pub fn add_days(&self, days: f64) -> Self {
        Self::from_ut(self.ut + days)
    }

    pub(crate) fn add_days_with(&self, days: f64, model: DeltaT) -> Self {
        Self::from_ut_with(self.ut + days, model)
    }

    /// Linear interpolation between two times by a fraction in [0, 1].
    ///
    /// Both scales are interpolated directly, which keeps search scalars
    /// smooth: ΔT varies negligibly over any bracket a search would use.
    pub fn interpolate(t1: Self, t2: Self, frac: f64) -> Self {
        Self {
            ut: t1.ut + frac * (t2.ut - t1.ut),
            tt: t1.tt + frac * (t2.tt - t1.tt),
        }
    }

    /// The civil UTC representation of this time.
    pub fn to_civil(&self) -> CivilTime {
        civil_from_ut(self.ut)
    }
}

impl PartialOrd for AstroTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.ut.partial_cmp(&other.ut)
    }
}

impl fmt::Display for AstroTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ct = self.to_civil();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:06.3}Z",
            ct.year, ct.month, ct.day, ct.hour, ct.minute, ct.second
        )
    }
}

/// Days since the J2000 epoch for the given civil UTC moment.
pub fn ut_from_civil(ct: &CivilTime) -> f64 {
    // Fliegel-Van Flandern day number arithmetic, proleptic Gregorian.
    let a = (14 - ct.month).div_euclid(12);
    let y = ct.year + 4800 - a;
    let m = ct.month + 12 * a - 3;
    let jdn = i64::from(ct.day)
        + i64::from((153 * m + 2).div_euclid(5))
        + 365 * i64::from(y)
        + i64::from(y.div_euclid(4))
        - i64::from(y.div_euclid(100))
        + i64::from(y.div_euclid(400))
        - 32045;
    let days = (jdn - 2_451_545) as f64;
    days - 0.5
        + (f64::from(ct.hour) + f64::from(ct.minute) / 60.0 + ct.second / 3600.0) / 24.0
}

/// The civil UTC moment for a UT day offset since J2000.
pub fn civil_from_ut(ut: f64) -> CivilTime {
    let t = ut + 0.5;
    let days = t.floor();
    let frac = t - days;
    let jdn = days as i64 + 2_451_545;
    let a = jdn + 32044;
    let b = (4 * a + 3).div_euclid(146_097);
    let c = a - 146_097 * b / 4;
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - 1461 * d / 4;
    let m = (5 * e + 2).div_euclid(153);
    let day = (e - (153 * m + 2).div_euclid(5) + 1) as i32;
    let month = (m + 3 - 12 * m.div_euclid(10)) as i32;
    let year = (100 * b + d - 4800 + m.div_euclid(10)) as i32;
    let hours = frac * 24.0;
    let hour = hours.floor();
    let minutes = (hours - hour) * 60.0;
    let minute = minutes.floor();
    let second = (minutes - minute) * 60.0;
    CivilTime {
        year,
        month,
        day,
        hour: hour as i32,
        minute: minute as i32,
        second,
    }
}

/// Earth Rotation Angle in degrees, in [0, 360).
pub fn era(time: AstroTime) -> f64 {
    let thet1 = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * time.ut;
    let thet3 = time.ut.fract();
    let mut theta = 360.0 * ((thet1 + thet3).fract());
    if theta < 0.0 {
        theta += 360.0;
    }
    theta
}

#[cfg(test)]
mod ut_time {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn j2000_epoch() {
        let t = AstroTime::from_civil(2000, 1, 1, 12, 0, 0.0);
        assert_abs_diff_eq!(t.ut, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.tt, 63.85 / 86400.0, epsilon = 1e-6);
    }

    #[test]
    fn civil_round_trip() {
        for &(y, mo, d, h, mi, s) in &[
            (1800, 2, 28, 23, 59, 59.0),
            (1900, 3, 1, 0, 0, 0.0),
            (1999, 12, 31, 23, 59, 30.0),
            (2017, 8, 21, 18, 25, 35.0),
            (2100, 7, 4, 6, 30, 15.5),
            (2200, 1, 1, 0, 0, 1.0),
        ] {
            let ct = CivilTime {
                year: y,
                month: mo,
                day: d,
                hour: h,
                minute: mi,
                second: s,
            };
            let ut = ut_from_civil(&ct);
            let back = civil_from_ut(ut);
            assert_eq!((back.year, back.month, back.day), (y, mo, d));
            assert_eq!((back.hour, back.minute), (h, mi));
            assert_abs_diff_eq!(back.second, s, epsilon = 1e-5);
        }
    }

    #[test]
    fn tt_ut_invariant() {
        for &ut in &[-720000.0, -36524.5, 0.0, 8421.5, 44196.0] {
            let t = AstroTime::from_ut(ut);
            assert_abs_diff_eq!(
                t.tt - t.ut,
                delta_t_espenak_meeus(ut) / 86400.0,
                epsilon = 0.0
            );
        }
    }

    #[test]
    fn era_range_and_reference() {
        // ERA at the J2000 epoch.
        assert_abs_diff_eq!(era(AstroTime::from_ut(0.0)), 280.460_618_375, epsilon = 1e-6);
        for i in -1000..1000 {
            let theta = era(AstroTime::from_ut(f64::from(i) * 3.7));
            assert!((0.0..360.0).contains(&theta));
        }
    }

    #[test]
    fn interpolate_endpoints() {
        let a = AstroTime::from_ut(10.0);
        let b = AstroTime::from_ut(20.0);
        assert_eq!(AstroTime::interpolate(a, b, 0.0), a);
        assert_eq!(AstroTime::interpolate(a, b, 1.0), b);
        assert_abs_diff_eq!(AstroTime::interpolate(a, b, 0.5).ut, 15.0, epsilon = 0.0);
    }
}
