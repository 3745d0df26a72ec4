/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Body identifiers and the heliocentric/geocentric position dispatch.

use core::fmt;

use crate::almanac::Almanac;
use crate::constants::gm;
use crate::constants::periods;
use crate::errors::{AlmagestResult, UnsupportedBodySnafu};
use crate::math::vectors::{AstroVector, StateVector};
use crate::math::Vector3;
use crate::time::AstroTime;

pub mod gravsim;
pub mod jupiter;
mod lighttime;
pub mod lunar;
pub mod pluto;
pub(crate) mod vsop;

pub use gravsim::GravitySimulator;
pub use jupiter::JupiterMoonsInfo;
pub use lighttime::correct_light_travel;
pub use lunar::MoonPosition;

/// Every body this crate can locate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    /// Solar-system barycenter.
    SSB,
    /// Earth-Moon barycenter.
    EMB,
    Star1,
    Star2,
    Star3,
    Star4,
    Star5,
    Star6,
    Star7,
    Star8,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Body {
    /// The sidereal orbital period in days, for bodies that orbit the Sun.
    pub fn orbital_period(&self) -> Option<f64> {
        match self {
            Body::Mercury => Some(periods::MERCURY_ORBITAL_PERIOD),
            Body::Venus => Some(periods::VENUS_ORBITAL_PERIOD),
            Body::Earth | Body::EMB => Some(periods::EARTH_ORBITAL_PERIOD),
            Body::Mars => Some(periods::MARS_ORBITAL_PERIOD),
            Body::Jupiter => Some(periods::JUPITER_ORBITAL_PERIOD),
            Body::Saturn => Some(periods::SATURN_ORBITAL_PERIOD),
            Body::Uranus => Some(periods::URANUS_ORBITAL_PERIOD),
            Body::Neptune => Some(periods::NEPTUNE_ORBITAL_PERIOD),
            Body::Pluto => Some(periods::PLUTO_ORBITAL_PERIOD),
            _ => None,
        }
    }

    /// GM product in au^3/day^2.
    pub fn mass_product(&self) -> AlmagestResult<f64> {
        match self {
            Body::Sun => Ok(gm::SUN_GM),
            Body::Moon => Ok(gm::MOON_GM),
            Body::Mercury => Ok(gm::MERCURY_GM),
            Body::Venus => Ok(gm::VENUS_GM),
            Body::Earth => Ok(gm::EARTH_GM),
            Body::EMB => Ok(gm::EARTH_GM + gm::MOON_GM),
            Body::Mars => Ok(gm::MARS_GM),
            Body::Jupiter => Ok(gm::JUPITER_GM),
            Body::Saturn => Ok(gm::SATURN_GM),
            Body::Uranus => Ok(gm::URANUS_GM),
            Body::Neptune => Ok(gm::NEPTUNE_GM),
            Body::Pluto => Ok(gm::PLUTO_GM),
            _ => UnsupportedBodySnafu {
                body: *self,
                action: "looking up a GM product",
            }
            .fail(),
        }
    }

    pub(crate) fn star_index(&self) -> Option<usize> {
        match self {
            Body::Star1 => Some(0),
            Body::Star2 => Some(1),
            Body::Star3 => Some(2),
            Body::Star4 => Some(3),
            Body::Star5 => Some(4),
            Body::Star6 => Some(5),
            Body::Star7 => Some(6),
            Body::Star8 => Some(7),
            _ => None,
        }
    }

    pub(crate) fn is_user_star(&self) -> bool {
        self.star_index().is_some()
    }

    fn vsop_model(&self) -> Option<&'static vsop::VsopModel> {
        match self {
            Body::Mercury => Some(&vsop::MERCURY),
            Body::Venus => Some(&vsop::VENUS),
            Body::Earth => Some(&vsop::EARTH),
            Body::Mars => Some(&vsop::MARS),
            Body::Jupiter => Some(&vsop::JUPITER),
            Body::Saturn => Some(&vsop::SATURN),
            Body::Uranus => Some(&vsop::URANUS),
            Body::Neptune => Some(&vsop::NEPTUNE),
            _ => None,
        }
    }
}

/// Ratio by which the Moon's geocentric vector shrinks toward the Earth-Moon
/// barycenter.
const EMB_MOON_FACTOR: f64 = 1.0 / (1.0 + 81.300_568_221_497_22);

impl Almanac {
    /// Heliocentric position of a body in the J2000 equatorial frame,
    /// uncorrected for light travel.
    ///
    /// The returned vector's `time` always equals `time`.
    pub fn helio_vector(&self, body: Body, time: AstroTime) -> AlmagestResult<AstroVector> {
        if let Some(model) = body.vsop_model() {
            return Ok(AstroVector::from_vector3(
                vsop::vsop_position(model, time.tt),
                time,
            ));
        }
        match body {
            Body::Sun => Ok(AstroVector::new(0.0, 0.0, 0.0, time)),
            Body::Moon => {
                let earth = vsop::vsop_position(&vsop::EARTH, time.tt);
                Ok(AstroVector::from_vector3(
                    earth + lunar::geo_moon(time),
                    time,
                ))
            }
            Body::EMB => {
                let earth = vsop::vsop_position(&vsop::EARTH, time.tt);
                Ok(AstroVector::from_vector3(
                    earth + lunar::geo_moon(time) * EMB_MOON_FACTOR,
                    time,
                ))
            }
            Body::Pluto => Ok(self.calc_pluto(time, true)?.position()),
            Body::SSB => Ok(AstroVector::from_vector3(ssb_offset(time.tt), time)),
            star if star.is_user_star() => match self.user_star(star) {
                Some(def) => Ok(AstroVector::from_vector3(def.vector(), time)),
                None => UnsupportedBodySnafu {
                    body: star,
                    action: "computing a heliocentric position of an undefined star",
                }
                .fail(),
            },
            other => UnsupportedBodySnafu {
                body: other,
                action: "computing a heliocentric position",
            }
            .fail(),
        }
    }

    /// Heliocentric position and velocity in the J2000 equatorial frame.
    pub fn helio_state(&self, body: Body, time: AstroTime) -> AlmagestResult<StateVector> {
        if let Some(model) = body.vsop_model() {
            let (pos, vel) = vsop::vsop_state(model, time.tt);
            return Ok(StateVector::new(pos, vel, time));
        }
        match body {
            Body::Sun => Ok(StateVector::new(Vector3::zeros(), Vector3::zeros(), time)),
            Body::Pluto => self.calc_pluto(time, true),
            Body::Moon | Body::EMB | Body::SSB => {
                // Central difference; these bodies have no analytic velocity
                // in this crate.
                let dt = 1.0e-3;
                let fwd = self.helio_vector(body, time_shift(time, dt))?;
                let bwd = self.helio_vector(body, time_shift(time, -dt))?;
                let pos = self.helio_vector(body, time)?;
                Ok(StateVector::new(
                    pos.pos,
                    (fwd.pos - bwd.pos) / (2.0 * dt),
                    time,
                ))
            }
            star if star.is_user_star() => {
                let pos = self.helio_vector(star, time)?;
                Ok(StateVector::new(pos.pos, Vector3::zeros(), time))
            }
            other => UnsupportedBodySnafu {
                body: other,
                action: "computing a heliocentric state",
            }
            .fail(),
        }
    }

    /// Distance from the Sun in AU; cheap scalar used by the apsis searches.
    pub fn helio_distance(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        Ok(self.helio_vector(body, time)?.length())
    }

    /// The geocentric Moon in the J2000 equatorial frame.
    pub fn geo_moon(&self, time: AstroTime) -> AstroVector {
        AstroVector::from_vector3(lunar::geo_moon(time), time)
    }

    /// The geocentric Moon in ecliptic coordinates of date.
    pub fn ecliptic_geo_moon(&self, time: AstroTime) -> MoonPosition {
        lunar::ecliptic_geo_moon(time)
    }
}

/// Shifts both time scales by `days`; internal helper for finite differences
/// where recomputing ΔT would only add noise.
fn time_shift(time: AstroTime, days: f64) -> AstroTime {
    AstroTime {
        ut: time.ut + days,
        tt: time.tt + days,
    }
}

/// The solar-system barycenter relative to the Sun, from the eight planets
/// (the Moon folded into the EMB).
fn ssb_offset(tt: f64) -> Vector3 {
    let gm_total = gm::SUN_GM
        + gm::MERCURY_GM
        + gm::VENUS_GM
        + gm::EARTH_GM
        + gm::MOON_GM
        + gm::MARS_GM
        + gm::JUPITER_GM
        + gm::SATURN_GM
        + gm::URANUS_GM
        + gm::NEPTUNE_GM;
    let mut offset = Vector3::zeros();
    for (body_gm, model) in [
        (gm::MERCURY_GM, &vsop::MERCURY),
        (gm::VENUS_GM, &vsop::VENUS),
        (gm::EARTH_GM + gm::MOON_GM, &vsop::EARTH),
        (gm::MARS_GM, &vsop::MARS),
        (gm::JUPITER_GM, &vsop::JUPITER),
        (gm::SATURN_GM, &vsop::SATURN),
        (gm::URANUS_GM, &vsop::URANUS),
        (gm::NEPTUNE_GM, &vsop::NEPTUNE),
    ] {
        offset += vsop::vsop_position(model, tt) * (body_gm / gm_total);
    }
    offset
}

#[cfg(test)]
mod ut_ephemerides {
    use super::*;

    #[test]
    fn helio_vector_time_stamp() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(123.456);
        for body in [
            Body::Sun,
            Body::Moon,
            Body::Mercury,
            Body::Earth,
            Body::Neptune,
            Body::Pluto,
            Body::EMB,
            Body::SSB,
        ] {
            let v = almanac.helio_vector(body, t).unwrap();
            assert_eq!(v.time, t);
        }
    }

    #[test]
    fn helio_distances_sane() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(3456.0);
        for body in [
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
        ] {
            let r = almanac.helio_distance(body, t).unwrap();
            assert!(r > 0.1 && r < 50.0, "{body} at {r} au");
        }
    }

    #[test]
    fn undefined_star_is_rejected() {
        let almanac = Almanac::new();
        let t = AstroTime::from_ut(0.0);
        assert!(almanac.helio_vector(Body::Star3, t).is_err());
        almanac.define_star(Body::Star3, 14.66, -60.83, 4.37).unwrap();
        let v = almanac.helio_vector(Body::Star3, t).unwrap();
        assert!(v.length() > 4.0 * crate::constants::AU_PER_LY);
    }

    #[test]
    fn mass_products() {
        assert!(Body::Jupiter.mass_product().unwrap() > Body::Saturn.mass_product().unwrap());
        assert!(Body::Star1.mass_product().is_err());
    }
}
