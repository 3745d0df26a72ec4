/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Closed-form elliptic-element model for Jupiter's Galilean moons.
//!
//! Elements live in the jovian equatorial frame (JUP); states are rotated
//! into the J2000 equatorial frame before they are returned. Mean motions
//! and epochs follow the E5 theory; eccentricity and node vectors carry their
//! secular precession rates.

use crate::almanac::Almanac;
use crate::errors::{AlmagestResult, NonConvergentSnafu};
use crate::math::rotation::RotationMatrix;
use crate::math::vectors::StateVector;
use crate::math::Vector3;
use crate::time::AstroTime;

/// Jovicentric states of the four Galilean moons, J2000 equatorial frame.
#[derive(Copy, Clone, Debug)]
pub struct JupiterMoonsInfo {
    pub io: StateVector,
    pub europa: StateVector,
    pub ganymede: StateVector,
    pub callisto: StateVector,
}

type ElementSeries = &'static [(f64, f64, f64)];

struct JupiterMoonModel {
    /// Gravitational parameter of the system, au^3/day^2.
    mu: f64,
    /// Mean longitude at epoch (rad) and mean motion (rad/day).
    al: (f64, f64),
    /// Semi-major axis series, au.
    a: ElementSeries,
    /// Periodic longitude corrections, rad.
    l: ElementSeries,
    /// Eccentricity vector series: e * exp(i pomega).
    z: ElementSeries,
    /// Inclination vector series: sin(i/2) * exp(i node).
    zeta: ElementSeries,
}

static IO: JupiterMoonModel = JupiterMoonModel {
    mu: 2.8253459095242264e-7,
    al: (1.8513962267636, 3.5515522628601),
    a: &[(0.0028188917735, 0.0, 0.0)],
    l: &[],
    z: &[(0.0041000, 1.6945070095055, 0.0028167146232)],
    zeta: &[(0.0003142, 5.4512671378995, -0.0023176900834)],
};

static EUROPA: JupiterMoonModel = JupiterMoonModel {
    mu: 2.8253459095242264e-7,
    al: (3.0670995576537, 1.7693227223950),
    a: &[(0.0044855858407, 0.0, 0.0)],
    l: &[],
    z: &[(0.0094000, 2.7029268353813, 0.0008248961861)],
    zeta: &[(0.0040666, 1.7530278993249, -0.0005695121050)],
};

static GANYMEDE: JupiterMoonModel = JupiterMoonModel {
    mu: 2.8253459095242264e-7,
    al: (2.1041485258521, 0.8782079526573),
    a: &[(0.0071552635007, 0.0, 0.0)],
    l: &[],
    z: &[(0.0013000, 3.2844303995730, 0.0001243955499)],
    zeta: &[(0.0015446, 2.0803312392806, -0.0001252628040)],
};

static CALLISTO: JupiterMoonModel = JupiterMoonModel {
    mu: 2.8253459095242264e-7,
    al: (1.4738361309967, 0.3764862112669),
    a: &[(0.0125851334643, 0.0, 0.0)],
    l: &[],
    z: &[(0.0074000, 5.8518585984757, 0.0000321137092)],
    zeta: &[(0.0016755, 5.6307567981746, -0.0000307062757)],
};

/// Rotation from the jovian equatorial frame to the J2000 equatorial frame,
/// from the IAU pole of Jupiter (RA 268.056595, Dec 64.495303 degrees).
fn rotation_jup_eqj() -> RotationMatrix {
    RotationMatrix::from_rows([
        [0.999424812111, 0.030607557241, -0.014602136036],
        [-0.033912312470, 0.902030853006, -0.430337420274],
        [0.000000000000, 0.430585087602, 0.902549988829],
    ])
}

fn eval_series_cos(series: ElementSeries, t: f64) -> f64 {
    series
        .iter()
        .map(|&(amp, phase, freq)| amp * (phase + t * freq).cos())
        .sum()
}

fn eval_series_sin(series: ElementSeries, t: f64) -> f64 {
    series
        .iter()
        .map(|&(amp, phase, freq)| amp * (phase + t * freq).sin())
        .sum()
}

/// Solves Kepler's equation for the eccentric anomaly.
fn kepler(mean_anomaly: f64, ecc: f64) -> AlmagestResult<f64> {
    let mut e_anom = mean_anomaly;
    for _ in 0..20 {
        let delta = (e_anom - ecc * e_anom.sin() - mean_anomaly) / (1.0 - ecc * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < 1.0e-12 {
            return Ok(e_anom);
        }
    }
    NonConvergentSnafu {
        iter: 20usize,
        action: "solving Kepler's equation for a Galilean moon",
    }
    .fail()
}

fn moon_state(model: &JupiterMoonModel, time: AstroTime) -> AlmagestResult<StateVector> {
    let t = time.tt;
    let a: f64 = eval_series_cos(model.a, t);
    let al = model.al.0 + model.al.1 * t;
    let l = al + eval_series_sin(model.l, t);
    let zr = eval_series_cos(model.z, t);
    let zi = eval_series_sin(model.z, t);
    let zetar = eval_series_cos(model.zeta, t);
    let zetai = eval_series_sin(model.zeta, t);

    let ecc = zr.hypot(zi);
    let pomega = zi.atan2(zr);
    let node = zetai.atan2(zetar);
    let half_inc = zetar.hypot(zetai).asin();
    let arg_peri = pomega - node;

    let mean_anomaly = (l - pomega).rem_euclid(2.0 * core::f64::consts::PI);
    let e_anom = kepler(mean_anomaly, ecc)?;
    let n = (model.mu / (a * a * a)).sqrt();

    // Perifocal position and velocity.
    let denom = 1.0 - ecc * e_anom.cos();
    let xv = a * (e_anom.cos() - ecc);
    let yv = a * (1.0 - ecc * ecc).sqrt() * e_anom.sin();
    let vxv = -a * n * e_anom.sin() / denom;
    let vyv = a * n * (1.0 - ecc * ecc).sqrt() * e_anom.cos() / denom;

    // Perifocal -> jovian equatorial: Rz(node) Rx(inc) Rz(arg_peri).
    let rot = RotationMatrix::identity()
        .pivot(2, arg_peri.to_degrees())
        .pivot(0, (2.0 * half_inc).to_degrees())
        .pivot(2, node.to_degrees());
    let pos_jup = rot.rotate_vector3(&Vector3::new(xv, yv, 0.0));
    let vel_jup = rot.rotate_vector3(&Vector3::new(vxv, vyv, 0.0));

    let to_eqj = rotation_jup_eqj();
    Ok(StateVector::new(
        to_eqj.rotate_vector3(&pos_jup),
        to_eqj.rotate_vector3(&vel_jup),
        time,
    ))
}

impl Almanac {
    /// Jovicentric states of Io, Europa, Ganymede and Callisto in the J2000
    /// equatorial frame.
    pub fn jupiter_moons(&self, time: AstroTime) -> AlmagestResult<JupiterMoonsInfo> {
        Ok(JupiterMoonsInfo {
            io: moon_state(&IO, time)?,
            europa: moon_state(&EUROPA, time)?,
            ganymede: moon_state(&GANYMEDE, time)?,
            callisto: moon_state(&CALLISTO, time)?,
        })
    }
}

#[cfg(test)]
mod ut_jupiter {
    use super::*;
    use crate::constants::KM_PER_AU;
    use approx::assert_abs_diff_eq;

    #[test]
    fn orbital_radii() {
        let almanac = Almanac::new();
        let mut tt = 0.0;
        while tt < 100.0 {
            let info = almanac
                .jupiter_moons(AstroTime { ut: tt, tt })
                .unwrap();
            for (state, km) in [
                (info.io, 421_700.0),
                (info.europa, 671_000.0),
                (info.ganymede, 1_070_400.0),
                (info.callisto, 1_882_700.0),
            ] {
                let r = state.pos.norm() * KM_PER_AU;
                assert!((r - km).abs() / km < 0.02, "radius {r} vs {km}");
            }
            tt += 3.7;
        }
    }

    #[test]
    fn io_period() {
        // Advance one Io orbital period; the position should return close to
        // where it started.
        let almanac = Almanac::new();
        let t0 = AstroTime { ut: 0.0, tt: 0.0 };
        let per = 1.769137786;
        let t1 = AstroTime { ut: per, tt: per };
        let a = almanac.jupiter_moons(t0).unwrap().io;
        let b = almanac.jupiter_moons(t1).unwrap().io;
        let sep = (a.pos - b.pos).norm() / a.pos.norm();
        assert!(sep < 0.02, "relative separation {sep}");
    }

    #[test]
    fn velocity_is_orbital() {
        let almanac = Almanac::new();
        let info = almanac
            .jupiter_moons(AstroTime { ut: 50.0, tt: 50.0 })
            .unwrap();
        // Io's circular speed is about 17.3 km/s.
        let io_speed = info.io.vel.norm() * KM_PER_AU / 86400.0;
        assert_abs_diff_eq!(io_speed, 17.3, epsilon = 0.3);
        // Velocity is roughly perpendicular to position for near-circular
        // orbits.
        let cosang = info.io.pos.dot(&info.io.vel) / (info.io.pos.norm() * info.io.vel.norm());
        assert!(cosang.abs() < 0.02);
    }
}
