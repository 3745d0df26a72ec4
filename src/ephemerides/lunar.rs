/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Geocentric lunar theory after Brown, in the compact arrangement of
//! Montenbruck and Pfleger.
//!
//! Produces the Moon in spherical ecliptic coordinates of the mean equinox of
//! date, converted on demand to the J2000 equatorial frame.

use core::f64::consts::TAU;

use crate::constants::{ARC, DEG2RAD, EARTH_EQUATORIAL_RADIUS_KM, KM_PER_AU};
use crate::math::rotation::rot_x;
use crate::math::Vector3;
use crate::orientations::{mean_obliquity, precession_matrix, PrecessDirection};
use crate::time::AstroTime;

/// Geocentric Moon in ecliptic coordinates of the mean equinox of date.
#[derive(Copy, Clone, Debug)]
pub struct MoonPosition {
    /// Ecliptic latitude in degrees.
    pub geo_eclip_lat: f64,
    /// Ecliptic longitude in degrees, [0, 360).
    pub geo_eclip_lon: f64,
    /// Distance in AU.
    pub distance_au: f64,
}

/// Longitude/latitude/parallax perturbation rows: the sine amplitude applied
/// to DLAM and DS, the cosine amplitudes applied to GAM1C and SINPI, and the
/// integer multiples of (l, l', F, D).
#[rustfmt::skip]
static SOLAR_TERMS: [(f64, f64, f64, f64, i8, i8, i8, i8); 104] = [
    (    13.902,    14.06, -0.001,   0.2607,  0,  0,  0,  4),
    (     0.403,    -4.01,  0.394,   0.0023,  0,  0,  0,  3),
    (  2369.912,  2373.36,  0.601,  28.2333,  0,  0,  0,  2),
    (  -125.154,  -112.79, -0.725,  -0.9781,  0,  0,  0,  1),
    (     1.979,     6.98, -0.445,   0.0433,  1,  0,  0,  4),
    (   191.953,   192.72,  0.029,   3.1383,  1,  0,  0,  2),
    (    -8.466,   -13.51,  0.455,  -0.1116,  1,  0,  0,  1),
    ( 22639.500, 22609.07,  0.079, 186.5398,  1,  0,  0,  0),
    (    18.609,     3.59, -0.094,   0.0118,  1,  0,  0, -1),
    ( -4586.465, -4578.13, -0.244,  34.3117,  1,  0,  0, -2),
    (     3.215,     5.44,  0.192,  -0.0386,  1,  0,  0, -3),
    (   -38.428,   -38.64,  0.001,   0.6008,  1,  0,  0, -4),
    (    -0.393,    -1.43, -0.092,   0.0086,  1,  0,  0, -6),
    (    -0.289,    -1.59,  0.123,  -0.0053,  0,  1,  0,  4),
    (   -24.420,   -25.10,  0.040,  -0.3000,  0,  1,  0,  2),
    (    18.023,    17.93,  0.007,   0.1494,  0,  1,  0,  1),
    (  -668.146,  -126.98, -1.302,  -0.3997,  0,  1,  0,  0),
    (     0.560,     0.32, -0.001,  -0.0037,  0,  1,  0, -1),
    (  -165.145,  -165.06,  0.054,   1.9178,  0,  1,  0, -2),
    (    -1.877,    -6.46, -0.416,   0.0339,  0,  1,  0, -4),
    (     0.213,     1.02, -0.074,   0.0054,  2,  0,  0,  4),
    (    14.387,    14.78, -0.017,   0.2833,  2,  0,  0,  2),
    (    -0.586,    -1.20,  0.054,  -0.0100,  2,  0,  0,  1),
    (   769.016,   767.96,  0.107,  10.1657,  2,  0,  0,  0),
    (     1.750,     2.01, -0.018,   0.0155,  2,  0,  0, -1),
    (  -211.656,  -152.53,  5.679,  -0.3039,  2,  0,  0, -2),
    (     1.225,     0.91, -0.030,  -0.0088,  2,  0,  0, -3),
    (   -30.773,   -34.07, -0.308,   0.3722,  2,  0,  0, -4),
    (    -0.570,    -1.40, -0.074,   0.0109,  2,  0,  0, -6),
    (    -2.921,   -11.75,  0.787,  -0.0484,  1,  1,  0,  2),
    (     1.267,     1.52, -0.022,   0.0164,  1,  1,  0,  1),
    (  -109.673,  -115.18,  0.461,  -0.9490,  1,  1,  0,  0),
    (  -205.962,  -182.36,  2.056,   1.4437,  1,  1,  0, -2),
    (     0.233,     0.36,  0.012,  -0.0025,  1,  1,  0, -3),
    (    -4.391,    -9.66, -0.471,   0.0673,  1,  1,  0, -4),
    (     0.283,     1.53, -0.111,   0.0060,  1, -1,  0,  4),
    (    14.577,    31.70, -1.540,   0.2302,  1, -1,  0,  2),
    (   147.687,   138.76,  0.679,   1.1528,  1, -1,  0,  0),
    (    -1.089,     0.55,  0.021,   0.0000,  1, -1,  0, -1),
    (    28.475,    23.59, -0.443,  -0.2257,  1, -1,  0, -2),
    (    -0.276,    -0.38, -0.006,  -0.0036,  1, -1,  0, -3),
    (     0.636,     2.27,  0.146,  -0.0102,  1, -1,  0, -4),
    (    -0.189,    -1.68,  0.131,  -0.0028,  0,  2,  0,  2),
    (    -7.486,    -0.66, -0.037,  -0.0086,  0,  2,  0,  0),
    (    -8.096,   -16.35, -0.740,   0.0918,  0,  2,  0, -2),
    (    -5.741,    -0.04,  0.000,  -0.0009,  0,  0,  2,  2),
    (     0.255,     0.00,  0.000,   0.0000,  0,  0,  2,  1),
    (  -411.608,    -0.20,  0.000,  -0.0124,  0,  0,  2,  0),
    (     0.584,     0.84,  0.000,   0.0071,  0,  0,  2, -1),
    (   -55.173,   -52.14,  0.000,  -0.1052,  0,  0,  2, -2),
    (     0.254,     0.25,  0.000,  -0.0017,  0,  0,  2, -3),
    (     0.025,    -1.67,  0.000,   0.0031,  0,  0,  2, -4),
    (     1.060,     2.96, -0.166,   0.0243,  3,  0,  0,  2),
    (    36.124,    50.64, -1.300,   0.6215,  3,  0,  0,  0),
    (   -13.193,   -16.40,  0.258,  -0.1187,  3,  0,  0, -2),
    (    -1.187,    -0.74,  0.042,   0.0074,  3,  0,  0, -4),
    (    -0.293,    -0.31, -0.002,   0.0046,  3,  0,  0, -6),
    (    -0.290,    -1.45,  0.116,  -0.0051,  2,  1,  0,  2),
    (    -7.649,   -10.56,  0.259,  -0.1038,  2,  1,  0,  0),
    (    -8.627,    -7.59,  0.078,  -0.0192,  2,  1,  0, -2),
    (    -2.740,    -2.54,  0.022,   0.0324,  2,  1,  0, -4),
    (     1.181,     3.32, -0.212,   0.0213,  2, -1,  0,  2),
    (     9.703,    11.67, -0.151,   0.1268,  2, -1,  0,  0),
    (    -0.352,    -0.37,  0.001,  -0.0028,  2, -1,  0, -1),
    (    -2.494,    -1.17, -0.003,  -0.0017,  2, -1,  0, -2),
    (     0.360,     0.20, -0.012,  -0.0043,  2, -1,  0, -4),
    (    -1.167,    -1.25,  0.008,  -0.0106,  1,  2,  0,  0),
    (    -7.412,    -6.12,  0.117,   0.0484,  1,  2,  0, -2),
    (    -0.311,    -0.65, -0.032,   0.0044,  1,  2,  0, -4),
    (     0.757,     1.82, -0.105,   0.0112,  1, -2,  0,  2),
    (     2.580,     2.32,  0.027,   0.0196,  1, -2,  0,  0),
    (     2.533,     2.40, -0.014,  -0.0212,  1, -2,  0, -2),
    (    -0.344,    -0.57, -0.025,   0.0036,  0,  3,  0, -2),
    (    -0.992,    -0.02,  0.000,   0.0000,  1,  0,  2,  2),
    (   -45.099,    -0.02,  0.000,  -0.0010,  1,  0,  2,  0),
    (    -0.179,    -9.52,  0.000,  -0.0833,  1,  0,  2, -2),
    (    -0.301,    -0.33,  0.000,   0.0014,  1,  0,  2, -4),
    (    -6.382,    -3.37,  0.000,  -0.0481,  1,  0, -2,  2),
    (    39.528,    85.13,  0.000,  -0.7136,  1,  0, -2,  0),
    (     9.366,     0.71,  0.000,  -0.0112,  1,  0, -2, -2),
    (     0.202,     0.02,  0.000,   0.0000,  1,  0, -2, -4),
    (     0.415,     0.10,  0.000,   0.0013,  0,  1,  2,  0),
    (    -2.152,    -2.26,  0.000,  -0.0066,  0,  1,  2, -2),
    (    -1.440,    -1.30,  0.000,   0.0014,  0,  1, -2,  2),
    (     0.384,    -0.04,  0.000,   0.0000,  0,  1, -2, -2),
    (     1.938,     3.60, -0.145,   0.0401,  4,  0,  0,  0),
    (    -0.952,    -1.58,  0.088,  -0.0130,  4,  0,  0, -2),
    (    -0.551,    -0.94,  0.035,  -0.0097,  3,  1,  0,  0),
    (    -0.482,    -0.57,  0.068,  -0.0045,  3,  1,  0, -2),
    (     0.681,     0.96, -0.053,   0.0115,  3, -1,  0,  0),
    (    -0.297,    -0.27,  0.002,  -0.0009,  2,  2,  0, -2),
    (     0.254,     0.21, -0.001,   0.0000,  2, -2,  0, -2),
    (    -0.250,    -0.22,  0.004,   0.0014,  1,  3,  0, -2),
    (    -3.996,     0.00,  0.000,   0.0004,  2,  0,  2,  0),
    (     0.557,    -0.75,  0.000,  -0.0090,  2,  0,  2, -2),
    (    -0.459,    -0.38,  0.000,  -0.0053,  2,  0, -2,  2),
    (    -1.298,     0.74,  0.000,   0.0004,  2,  0, -2,  0),
    (     0.538,     1.14,  0.000,  -0.0141,  2,  0, -2, -2),
    (     0.263,     0.02,  0.000,   0.0000,  1,  1,  2,  0),
    (     0.426,     0.07,  0.000,  -0.0006,  1,  1, -2, -2),
    (    -0.304,     0.03,  0.000,   0.0003,  3,  0,  2,  0),
    (    -0.372,    -0.19,  0.000,  -0.0027,  3,  0, -2, -2),
    (     0.418,     0.00,  0.000,   0.0000,  0,  0,  4,  0),
    (    -0.330,    -0.04,  0.000,   0.0000,  3,  0, -2,  0),
];

/// Latitude N-term rows: coefficient and multiples of (l, l', F, D).
#[rustfmt::skip]
static N_TERMS: [(f64, i8, i8, i8, i8); 10] = [
    (-526.069,  0,  0,  1, -2),
    (  -3.352,  0,  0,  1, -4),
    (  44.297,  1,  0,  1, -2),
    (  -6.000,  1,  0,  1, -4),
    (  20.599, -1,  0,  1,  0),
    ( -30.598, -1,  0,  1, -2),
    ( -24.649, -2,  0,  1,  0),
    (  -2.000, -2,  0,  1, -2),
    ( -22.571,  0,  1,  1, -2),
    (  10.985,  0, -1,  1, -2),
];

fn frac(x: f64) -> f64 {
    x - x.floor()
}

fn sine(phi: f64) -> f64 {
    (TAU * phi).sin()
}

/// Evaluation state: fundamental arguments, accumulators, and the
/// multiple-angle tables for cos/sin of j * arg, j in [-6, 6].
struct MoonContext {
    dgam: f64,
    l0: f64,
    f: f64,
    dlam: f64,
    ds: f64,
    gam1c: f64,
    sinpi: f64,
    n: f64,
    co: [[f64; 4]; 13],
    si: [[f64; 4]; 13],
}

impl MoonContext {
    fn new(tt: f64) -> Self {
        let t = tt / 36525.0;
        let mut l0 = frac(0.60643382 + (1336.85522467 - 0.00000313 * t) * t);
        let mut l = TAU * frac(0.37489701 + (1325.55240982 + 0.00002565 * t) * t);
        let mut ls = TAU * frac(0.99312619 + (99.99735956 - 0.00000044 * t) * t);
        let mut f = TAU * frac(0.25909118 + (1342.22782980 - 0.00000892 * t) * t);
        let mut d = TAU * frac(0.82736186 + (1236.85308708 - 0.00000397 * t) * t);

        // Long-period corrections to the mean arguments.
        let s1 = sine(0.19833 + 0.05611 * t);
        let s2 = sine(0.27869 + 0.04508 * t);
        let s3 = sine(0.16827 - 0.36903 * t);
        let s4 = sine(0.34734 - 5.37261 * t);
        let s5 = sine(0.10498 - 5.37899 * t);
        let s6 = sine(0.42681 - 0.41855 * t);
        let s7 = sine(0.14943 - 5.37511 * t);
        let dl0 = 0.84 * s1 + 0.31 * s2 + 14.27 * s3 + 7.26 * s4 + 0.28 * s5 + 0.24 * s6;
        let dl = 2.94 * s1 + 0.31 * s2 + 14.27 * s3 + 9.34 * s4 + 1.12 * s5 + 0.83 * s6;
        let dls = -6.40 * s1 - 1.89 * s6;
        let df =
            0.21 * s1 + 0.31 * s2 + 14.27 * s3 - 88.70 * s4 - 15.30 * s5 + 0.24 * s6 - 1.86 * s7;
        let dd = dl0 - dls;
        let dgam = -3332.0e-9 * sine(0.59734 - 5.37261 * t)
            - 539.0e-9 * sine(0.35498 - 5.37899 * t)
            - 64.0e-9 * sine(0.39943 - 5.37511 * t);

        l0 = TAU * frac(l0) + dl0 / ARC;
        l += dl / ARC;
        ls += dls / ARC;
        f += df / ARC;
        d += dd / ARC;

        let mut ctx = Self {
            dgam,
            l0,
            f,
            dlam: 0.0,
            ds: 0.0,
            gam1c: 0.0,
            sinpi: 3422.7000,
            n: 0.0,
            co: [[0.0; 4]; 13],
            si: [[0.0; 4]; 13],
        };

        // Brown's eccentricity factor scales the l' multiples.
        let args = [
            (l, 4usize, 1.000002208),
            (ls, 3, 0.997504612 - 0.002495388 * t),
            (f, 4, 1.000002708 + 139.978 * dgam),
            (d, 6, 1.0),
        ];
        for (i, &(arg, max, fac)) in args.iter().enumerate() {
            ctx.co[6][i] = 1.0;
            ctx.si[6][i] = 0.0;
            ctx.co[7][i] = fac * arg.cos();
            ctx.si[7][i] = fac * arg.sin();
            ctx.co[5][i] = ctx.co[7][i];
            ctx.si[5][i] = -ctx.si[7][i];
            for j in 2..=max {
                let c = ctx.co[6 + j - 1][i] * ctx.co[7][i] - ctx.si[6 + j - 1][i] * ctx.si[7][i];
                let s = ctx.si[6 + j - 1][i] * ctx.co[7][i] + ctx.co[6 + j - 1][i] * ctx.si[7][i];
                ctx.co[6 + j][i] = c;
                ctx.si[6 + j][i] = s;
                ctx.co[6 - j][i] = c;
                ctx.si[6 - j][i] = -s;
            }
        }
        ctx
    }

    /// cos/sin of p*l + q*l' + r*F + s*D.
    fn term(&self, p: i8, q: i8, r: i8, s: i8) -> (f64, f64) {
        let mut x = 1.0;
        let mut y = 0.0;
        for (mult, i) in [(p, 0usize), (q, 1), (r, 2), (s, 3)] {
            if mult != 0 {
                let idx = (6 + i32::from(mult)) as usize;
                let cx = self.co[idx][i];
                let sx = self.si[idx][i];
                let nx = x * cx - y * sx;
                y = x * sx + y * cx;
                x = nx;
            }
        }
        (x, y)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_sol(
        &mut self,
        coeffl: f64,
        coeffs: f64,
        coeffg: f64,
        coeffp: f64,
        p: i8,
        q: i8,
        r: i8,
        s: i8,
    ) {
        let (x, y) = self.term(p, q, r, s);
        self.dlam += coeffl * y;
        self.ds += coeffs * y;
        self.gam1c += coeffg * x;
        self.sinpi += coeffp * x;
    }

    fn add_n(&mut self, coeffn: f64, p: i8, q: i8, r: i8, s: i8) {
        let (_, y) = self.term(p, q, r, s);
        self.n += coeffn * y;
    }
}

/// The geocentric Moon at the given time, mean ecliptic and equinox of date.
pub fn ecliptic_geo_moon(time: AstroTime) -> MoonPosition {
    let mut ctx = MoonContext::new(time.tt);
    for &(cl, cs, cg, cp, p, q, r, s) in SOLAR_TERMS.iter() {
        ctx.add_sol(cl, cs, cg, cp, p, q, r, s);
    }
    for &(cn, p, q, r, s) in N_TERMS.iter() {
        ctx.add_n(cn, p, q, r, s);
    }

    let s = ctx.f + ctx.ds / ARC;
    let lat_seconds = (1.000002708 + 139.978 * ctx.dgam)
        * (18518.511 + 1.189 + ctx.gam1c)
        * s.sin()
        - 6.24 * (3.0 * s).sin()
        + ctx.n;
    MoonPosition {
        geo_eclip_lat: lat_seconds / 3600.0,
        geo_eclip_lon: 360.0 * frac(ctx.l0 / TAU + ctx.dlam / 1_296_000.0),
        distance_au: ARC * (EARTH_EQUATORIAL_RADIUS_KM / KM_PER_AU) / (0.999953253 * ctx.sinpi),
    }
}

/// The geocentric Moon in the J2000 equatorial frame.
pub(crate) fn geo_moon(time: AstroTime) -> Vector3 {
    let moon = ecliptic_geo_moon(time);
    let lat = moon.geo_eclip_lat * DEG2RAD;
    let lon = moon.geo_eclip_lon * DEG2RAD;
    let dist = moon.distance_au;
    let ecm = Vector3::new(
        dist * lat.cos() * lon.cos(),
        dist * lat.cos() * lon.sin(),
        dist * lat.sin(),
    );
    // Mean ecliptic of date -> mean equator of date, then back to J2000.
    let mean_eqd = rot_x(-mean_obliquity(time) * DEG2RAD) * ecm;
    precession_matrix(time, PrecessDirection::Into2000).rotate_vector3(&mean_eqd)
}

#[cfg(test)]
mod ut_lunar {
    use super::*;
    use crate::math::vectors::{spherical_from_vector, AstroVector};
    use approx::assert_abs_diff_eq;

    #[test]
    fn moon_at_j2000() {
        let moon = ecliptic_geo_moon(AstroTime { ut: 0.0, tt: 0.0 });
        assert_abs_diff_eq!(moon.geo_eclip_lat, 5.1709, epsilon = 1e-3);
        assert_abs_diff_eq!(moon.geo_eclip_lon, 223.3186, epsilon = 1e-3);
        assert_abs_diff_eq!(moon.distance_au * KM_PER_AU, 402_432.0, epsilon = 50.0);
    }

    #[test]
    fn continuity_over_a_month() {
        let mut prev = ecliptic_geo_moon(AstroTime::from_ut(1000.0));
        for i in 1..=300 {
            let t = AstroTime::from_ut(1000.0 + 0.1 * f64::from(i));
            let cur = ecliptic_geo_moon(t);
            // 0.1 day of motion is under 1.6 degrees of longitude.
            let dlon = (cur.geo_eclip_lon - prev.geo_eclip_lon).rem_euclid(360.0);
            assert!(dlon < 1.6, "longitude jump {dlon}");
            assert!((cur.distance_au - prev.distance_au).abs() < 1.0e-4);
            prev = cur;
        }
    }

    #[test]
    fn distance_range() {
        // Perigee and apogee bracket: 356,000 km to 407,000 km.
        let mut tt = -15000.0;
        while tt < 15000.0 {
            let d = ecliptic_geo_moon(AstroTime { ut: tt, tt }).distance_au * KM_PER_AU;
            assert!(d > 354_000.0 && d < 408_000.0, "distance {d} km");
            tt += 0.77;
        }
    }

    #[test]
    fn round_trip_through_equatorial() {
        // ecliptic -> EQJ -> back through the ecliptic-of-date path agrees to
        // about an arcsecond.
        let time = AstroTime::from_ut(8432.5);
        let moon = ecliptic_geo_moon(time);
        let eqj = geo_moon(time);
        let back_mean_eqd =
            precession_matrix(time, PrecessDirection::From2000).rotate_vector3(&eqj);
        let ecm = rot_x(mean_obliquity(time) * DEG2RAD) * back_mean_eqd;
        let sph = spherical_from_vector(&AstroVector::from_vector3(ecm, time)).unwrap();
        assert_abs_diff_eq!(sph.lat, moon.geo_eclip_lat, epsilon = 1.0 / 3600.0);
        assert_abs_diff_eq!(sph.lon, moon.geo_eclip_lon, epsilon = 1.0 / 3600.0);
    }
}
