/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Cross-module invariants and round-trip laws.

use almagest::analysis::search::{search, SearchOptions};
use almagest::constants::AU_PER_LY;
use almagest::prelude::*;
use almagest::time::{delta_t_espenak_meeus, era};
use approx::assert_abs_diff_eq;
use rstest::*;

#[fixture]
fn almanac() -> Almanac {
    Almanac::new()
}

#[rstest]
fn helio_distance_bounds_all_bodies(almanac: Almanac) {
    // Every physical body stays between Mercury's perihelion and Pluto's
    // aphelion over a century around J2000.
    let bodies = [
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::EMB,
    ];
    let mut ut = -18262.5;
    while ut < 18262.5 {
        let t = almanac.time_from_ut(ut);
        for body in bodies {
            let r = almanac.helio_vector(body, t).unwrap().length();
            assert!(r >= 0.1 && r <= 50.0, "{body} at {r} au, ut {ut}");
        }
        ut += 1823.7;
    }
}

#[rstest]
fn times_carry_delta_t_invariant(almanac: Almanac) {
    for ut in [-500000.0, -100000.0, -1.5, 0.0, 777.7, 50000.0] {
        let t = almanac.time_from_ut(ut);
        assert_abs_diff_eq!(
            (t.tt - t.ut) * 86400.0,
            delta_t_espenak_meeus(ut),
            epsilon = 1e-9
        );
    }
}

#[rstest]
fn gast_tracks_era(almanac: Almanac) {
    // GAST differs from the Earth rotation angle only by the accumulated
    // GMST offset and the equation of the equinoxes: under a third of a
    // degree within a couple of decades of J2000.
    let _ = &almanac;
    for i in 0..200 {
        let t = AstroTime::from_ut(f64::from(i) * 37.3 - 3000.0);
        let gast_deg = almagest::orientations::sidereal_time(t) * 15.0;
        let delta = (gast_deg - era(t)).rem_euclid(360.0);
        let delta = if delta > 180.0 { delta - 360.0 } else { delta };
        assert!(delta.abs() < 0.3, "gast-era {delta} deg");
    }
}

#[rstest]
fn user_star_round_trip(almanac: Almanac) {
    // A defined star's apparent geocentric RA/Dec must come back almost
    // exactly (parallax at light-year range is sub-arcsecond).
    almanac.define_star(Body::Star1, 6.7525, -16.7161, 8.6).unwrap();
    let t = AstroTime::from_civil(2015, 4, 1, 12, 0, 0.0);
    let observer = Observer::new(0.0, 0.0, 0.0).unwrap();
    let equ = almanac.equator(Body::Star1, t, &observer, false, false).unwrap();
    assert_abs_diff_eq!(equ.ra, 6.7525, epsilon = 1e-4);
    assert_abs_diff_eq!(equ.dec, -16.7161, epsilon = 1e-3);
    assert!(equ.dist > 8.0 * AU_PER_LY);
}

#[rstest]
fn moon_phase_matches_quarter_times(almanac: Almanac) {
    let start = AstroTime::from_civil(2010, 7, 1, 0, 0, 0.0);
    let mut q = almanac.search_moon_quarter(start).unwrap();
    for _ in 0..6 {
        let phase = almanac.moon_phase(q.time).unwrap();
        let target = 90.0 * f64::from(q.quarter);
        let mut diff = (phase - target).rem_euclid(360.0);
        if diff > 180.0 {
            diff -= 360.0;
        }
        assert!(diff.abs() < 1e-4, "phase residual {diff}");
        q = almanac.next_moon_quarter(&q).unwrap();
    }
}

#[rstest]
fn search_contract_on_smooth_scalar(almanac: Almanac) {
    // For an ascending smooth function, search returns a time where the
    // function is within slope * tolerance of zero.
    let _ = &almanac;
    let t1 = AstroTime::from_ut(0.0);
    let t2 = AstroTime::from_ut(40.0);
    let f = |t: AstroTime| Ok((0.17 * (t.ut - 23.4)).tanh());
    let tol = 0.5;
    let found = search(f, t1, t2, SearchOptions::with_tolerance_seconds(tol))
        .unwrap()
        .unwrap();
    assert!((found.ut - 23.4).abs() < 2.0 * tol / 86400.0 + 1e-9);
}

#[rstest]
fn pluto_daily_motion_is_continuous(almanac: Almanac) {
    let mut prev: Option<f64> = None;
    let mut ut = -3000.0;
    while ut < 3000.0 {
        let t = almanac.time_from_ut(ut);
        let r = almanac.calc_pluto(t, true).unwrap().pos.norm();
        if let Some(prev_r) = prev {
            assert!((r - prev_r).abs() < 0.01, "jump at ut {ut}");
        }
        prev = Some(r);
        ut += 1.0;
    }
}

#[rstest]
fn equator_of_date_shifts_with_precession(almanac: Almanac) {
    // Over 25 years the equinox drifts ~0.35 degrees; of-date minus J2000
    // coordinates of the same star must reflect that scale.
    almanac.define_star(Body::Star2, 12.0, 0.0, 100.0).unwrap();
    let t = AstroTime::from_civil(2025, 1, 1, 0, 0, 0.0);
    let observer = Observer::new(0.0, 0.0, 0.0).unwrap();
    let j2000 = almanac.equator(Body::Star2, t, &observer, false, false).unwrap();
    let of_date = almanac.equator(Body::Star2, t, &observer, true, false).unwrap();
    let shift_deg = 15.0 * (of_date.ra - j2000.ra).abs();
    assert!(
        shift_deg > 0.1 && shift_deg < 0.6,
        "precession shift {shift_deg} deg"
    );
}

#[rstest]
fn hour_angle_search_is_consistent(almanac: Almanac) {
    // After searching for hour angle H, the body's hour angle at the found
    // time is H.
    let observer = Observer::new(-35.28, 149.13, 0.0).unwrap();
    let start = AstroTime::from_civil(2018, 2, 2, 0, 0, 0.0);
    for target in [0.0, 6.0, 18.0] {
        let info = almanac
            .search_hour_angle(Body::Moon, &observer, target, start, 1)
            .unwrap();
        let equ = almanac.equator(Body::Moon, info.time, &observer, true, true).unwrap();
        let gast = almagest::orientations::sidereal_time(info.time);
        let ha = (gast + observer.longitude / 15.0 - equ.ra).rem_euclid(24.0);
        let mut diff = (ha - target).rem_euclid(24.0);
        if diff > 12.0 {
            diff -= 24.0;
        }
        assert!(diff.abs() * 3600.0 < 1.0, "hour angle residual {diff} h");
    }
}
