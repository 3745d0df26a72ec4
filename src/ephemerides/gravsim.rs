/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Small-body propagation in the gravitational field of the Sun and the four
//! giant planets, with the same two-stage predictor-corrector the Pluto model
//! uses.

use super::pluto::{acceleration_at, sun_barycentric_state};
use super::Body;
use crate::almanac::Almanac;
use crate::errors::{AlmagestResult, UnsupportedBodySnafu};
use crate::math::vectors::StateVector;
use crate::math::Vector3;
use crate::time::AstroTime;

#[derive(Copy, Clone, Debug)]
struct SmallBodyCalc {
    r: Vector3,
    v: Vector3,
    a: Vector3,
}

/// One end of the simulation interval: a time and the small-body states.
struct Endpoint {
    time: AstroTime,
    bodies: Vec<SmallBodyCalc>,
}

/// Propagates user-supplied small bodies through time.
///
/// States are accepted and reported relative to `origin_body`, but the
/// integration itself runs in barycentric coordinates.
pub struct GravitySimulator<'a> {
    almanac: &'a Almanac,
    origin_body: Body,
    prev: Endpoint,
    curr: Endpoint,
}

impl<'a> GravitySimulator<'a> {
    /// Starts a simulation from origin-centric states at a common time.
    pub fn new(
        almanac: &'a Almanac,
        origin_body: Body,
        time: AstroTime,
        states: &[StateVector],
    ) -> AlmagestResult<Self> {
        let origin = origin_barycentric(almanac, origin_body, time)?;
        let bodies = states
            .iter()
            .map(|s| {
                let r = s.pos + origin.pos;
                let v = s.vel + origin.vel;
                SmallBodyCalc {
                    r,
                    v,
                    a: acceleration_at(&r, time.tt),
                }
            })
            .collect::<Vec<_>>();
        let curr = Endpoint {
            time,
            bodies: bodies.clone(),
        };
        Ok(Self {
            almanac,
            origin_body,
            prev: Endpoint { time, bodies },
            curr,
        })
    }

    pub fn origin_body(&self) -> Body {
        self.origin_body
    }

    pub fn time(&self) -> AstroTime {
        self.curr.time
    }

    /// Advances all bodies to `time` and returns their origin-centric states.
    ///
    /// Accuracy degrades with the step size; callers integrate through
    /// intermediate times when spanning months or more.
    pub fn update(&mut self, time: AstroTime) -> AlmagestResult<Vec<StateVector>> {
        let dt = time.tt - self.curr.time.tt;
        core::mem::swap(&mut self.prev, &mut self.curr);
        self.curr.time = time;
        self.curr.bodies.clear();
        for body in &self.prev.bodies {
            let predicted = body.r + (body.v + body.a * (dt / 2.0)) * dt;
            let acc_pred = acceleration_at(&predicted, time.tt);
            let mean_acc = (acc_pred + body.a) * 0.5;
            let r = body.r + (body.v + mean_acc * (dt / 2.0)) * dt;
            let v = body.v + mean_acc * dt;
            let a = acceleration_at(&r, time.tt);
            self.curr.bodies.push(SmallBodyCalc { r, v, a });
        }

        let origin = origin_barycentric(self.almanac, self.origin_body, time)?;
        Ok(self
            .curr
            .bodies
            .iter()
            .map(|b| StateVector::new(b.r - origin.pos, b.v - origin.vel, time))
            .collect())
    }
}

/// Barycentric state of the requested origin body, in the five-body
/// convention of the integrator.
fn origin_barycentric(
    almanac: &Almanac,
    origin_body: Body,
    time: AstroTime,
) -> AlmagestResult<StateVector> {
    match origin_body {
        Body::SSB => Ok(StateVector::new(Vector3::zeros(), Vector3::zeros(), time)),
        Body::Sun => {
            let (pos, vel) = sun_barycentric_state(time.tt);
            Ok(StateVector::new(pos, vel, time))
        }
        Body::Mercury
        | Body::Venus
        | Body::Earth
        | Body::Mars
        | Body::Jupiter
        | Body::Saturn
        | Body::Uranus
        | Body::Neptune => {
            let helio = almanac.helio_state(origin_body, time)?;
            let (sun_pos, sun_vel) = sun_barycentric_state(time.tt);
            Ok(StateVector::new(
                helio.pos + sun_pos,
                helio.vel + sun_vel,
                time,
            ))
        }
        other => UnsupportedBodySnafu {
            body: other,
            action: "using as a gravity-simulation origin",
        }
        .fail(),
    }
}

#[cfg(test)]
mod ut_gravsim {
    use super::*;
    use crate::constants::gm::SUN_GM;

    #[test]
    fn circular_orbit_stays_circular() {
        let almanac = Almanac::new();
        let t0 = AstroTime::from_ut(0.0);
        // A body on a circular 1 au heliocentric orbit.
        let r = 1.0;
        let speed = (SUN_GM / r).sqrt();
        let state = StateVector::new(
            Vector3::new(r, 0.0, 0.0),
            Vector3::new(0.0, speed, 0.0),
            t0,
        );
        let mut sim = GravitySimulator::new(&almanac, Body::Sun, t0, &[state]).unwrap();
        let mut time = t0;
        let mut out = Vec::new();
        for _ in 0..100 {
            time = time.add_days(1.0);
            out = sim.update(time).unwrap();
        }
        let dist = out[0].pos.norm();
        assert!((dist - 1.0).abs() < 1.0e-3, "radius drifted to {dist}");
    }

    #[test]
    fn origin_round_trip() {
        // A state handed in relative to the Earth comes back out unchanged
        // when no time has elapsed.
        let almanac = Almanac::new();
        let t0 = AstroTime::from_ut(500.0);
        let state = StateVector::new(
            Vector3::new(0.01, 0.0, 0.0),
            Vector3::new(0.0, 0.001, 0.0),
            t0,
        );
        let mut sim = GravitySimulator::new(&almanac, Body::Earth, t0, &[state]).unwrap();
        let out = sim.update(t0).unwrap();
        assert!((out[0].pos - state.pos).norm() < 1.0e-12);
        assert!((out[0].vel - state.vel).norm() < 1.0e-12);
    }

    #[test]
    fn rejects_star_origin() {
        let almanac = Almanac::new();
        let t0 = AstroTime::from_ut(0.0);
        assert!(GravitySimulator::new(&almanac, Body::Star1, t0, &[]).is_err());
    }
}
