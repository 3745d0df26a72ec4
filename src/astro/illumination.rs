/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Phase angle, visual magnitude, and disc-overlap geometry.

use core::f64::consts::PI;

use crate::almanac::Almanac;
use crate::constants::DEG2RAD;
use crate::ephemerides::Body;
use crate::errors::{AlmagestResult, UnsupportedBodySnafu};
use crate::math::angle_between;
use crate::math::vectors::AstroVector;
use crate::time::AstroTime;

/// Illumination data for a body at a time.
#[derive(Copy, Clone, Debug)]
pub struct IlluminationInfo {
    /// Sun-body-Earth phase angle, degrees.
    pub phase_angle: f64,
    /// Fraction of the visible disc that is lit, [0, 1].
    pub phase_fraction: f64,
    /// Apparent visual magnitude.
    pub magnitude: f64,
    /// Heliocentric distance, AU.
    pub helio_dist: f64,
    /// Geocentric distance, AU.
    pub geo_dist: f64,
    /// Saturn only: tilt of the ring plane toward the observer, degrees.
    pub ring_tilt: Option<f64>,
}

/// Fraction of disc 1 (radius `a`) hidden behind disc 2 (radius `b`) whose
/// centers are separated by `c`; all three in the same unit.
pub fn obscuration_discs(a: f64, b: f64, c: f64) -> f64 {
    if c >= a + b {
        return 0.0;
    }
    if c <= (a - b).abs() {
        // One disc lies entirely inside the other.
        return if b >= a { 1.0 } else { (b * b) / (a * a) };
    }
    // Two overlapping lens areas.
    let x = (a * a - b * b + c * c) / (2.0 * c);
    let y = (a * a - x * x).sqrt();
    let lens = a * a * (x / a).acos() - x * y + b * b * (((c - x) / b).acos()) - (c - x) * y;
    (lens / (PI * a * a)).clamp(0.0, 1.0)
}

impl Almanac {
    /// Sun-body-Earth phase angle in degrees.
    pub fn phase_angle(&self, body: Body, time: AstroTime) -> AlmagestResult<f64> {
        if body == Body::Sun {
            // The Sun is its own light source.
            return Ok(0.0);
        }
        let geo = self.geo_vector(body, time, true)?;
        let helio = if body == Body::Moon {
            // Sun-to-Moon vector via the geocentric Sun.
            let sun = self.geo_vector(Body::Sun, time, true)?;
            AstroVector::from_vector3(geo.pos - sun.pos, time)
        } else {
            self.helio_vector(body, time)?
        };
        Ok(angle_between(&helio.pos, &geo.pos))
    }

    /// Phase angle, illuminated fraction and apparent magnitude.
    pub fn illumination(&self, body: Body, time: AstroTime) -> AlmagestResult<IlluminationInfo> {
        if body == Body::Earth || body.is_user_star() {
            return UnsupportedBodySnafu {
                body,
                action: "computing illumination",
            }
            .fail();
        }
        let geo = self.geo_vector(body, time, true)?;
        let geo_dist = geo.length();
        let (phase_angle, helio_dist) = if body == Body::Sun {
            (0.0, 0.0)
        } else {
            (self.phase_angle(body, time)?, self.helio_distance(body, time)?)
        };
        let phase_fraction = (1.0 + (phase_angle * DEG2RAD).cos()) / 2.0;

        let mut ring_tilt = None;
        let magnitude = match body {
            Body::Sun => -26.732,
            Body::Moon => moon_magnitude(phase_angle, helio_dist, geo_dist),
            Body::Saturn => {
                let (mag, tilt) = self.saturn_magnitude(phase_angle, helio_dist, geo_dist, time)?;
                ring_tilt = Some(tilt);
                mag
            }
            _ => planet_magnitude(body, phase_angle, helio_dist, geo_dist)?,
        };

        Ok(IlluminationInfo {
            phase_angle,
            phase_fraction,
            magnitude,
            helio_dist,
            geo_dist,
            ring_tilt,
        })
    }

    /// Saturn's magnitude needs the ring tilt, derived from its geocentric
    /// ecliptic coordinates and the ascending node of the ring plane.
    fn saturn_magnitude(
        &self,
        phase_angle: f64,
        helio_dist: f64,
        geo_dist: f64,
        time: AstroTime,
    ) -> AlmagestResult<(f64, f64)> {
        let geo = self.geo_vector(Body::Saturn, time, true)?;
        let ecl = self.ecliptic(&geo)?;
        let ir = 28.06 * DEG2RAD;
        let nr = (169.51 + 3.82e-5 * time.tt) * DEG2RAD;
        let lat = ecl.elat * DEG2RAD;
        let lon = ecl.elon * DEG2RAD;
        let tilt = (lat.sin() * ir.cos() - lat.cos() * ir.sin() * (lon - nr).sin()).asin();
        let sin_tilt = tilt.sin().abs();
        let mut mag = -9.0 + 0.044 * phase_angle;
        mag += sin_tilt * (-2.6 + 1.2 * sin_tilt);
        mag += 5.0 * (helio_dist * geo_dist).log10();
        Ok((mag, tilt.to_degrees()))
    }
}

/// Moon apparent magnitude: polynomial of phase, scaled by the actual
/// distances against the mean ones.
fn moon_magnitude(phase: f64, helio_dist: f64, geo_dist: f64) -> f64 {
    let rad = phase * DEG2RAD;
    let mean_geo_au = 385_000.6 / crate::constants::KM_PER_AU;
    let mut mag = -12.717 + 1.49 * rad.abs() + 0.0431 * rad.powi(4);
    mag += 5.0 * ((helio_dist / 1.0) * (geo_dist / mean_geo_au)).log10();
    mag
}

/// Per-planet magnitude polynomials of phase angle.
fn planet_magnitude(
    body: Body,
    phase: f64,
    helio_dist: f64,
    geo_dist: f64,
) -> AlmagestResult<f64> {
    let c = phase / 100.0;
    let base = match body {
        Body::Mercury => -0.60 + c * (4.98 + c * (-4.88 + 3.02 * c)),
        Body::Venus => {
            if phase < 163.6 {
                -4.47 + c * (1.03 + c * (0.57 + 0.13 * c))
            } else {
                0.98 - 1.02 * c
            }
        }
        Body::Mars => -1.52 + 0.016 * phase,
        Body::Jupiter => -9.40 + 0.005 * phase,
        Body::Uranus => -7.19 + 0.002 * phase,
        Body::Neptune => -6.87,
        Body::Pluto => -1.00 + 0.041 * phase,
        other => {
            return UnsupportedBodySnafu {
                body: other,
                action: "computing a visual magnitude",
            }
            .fail()
        }
    };
    Ok(base + 5.0 * (helio_dist * geo_dist).log10())
}

#[cfg(test)]
mod ut_illumination {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn obscuration_bounds_and_continuity() {
        let a = 3.0;
        let b = 2.0;
        // Continuous at first contact.
        assert_abs_diff_eq!(obscuration_discs(a, b, a + b), 0.0, epsilon = 1e-12);
        assert!(obscuration_discs(a, b, a + b - 1e-6) < 1e-3);
        // Symmetric sweep stays in [0, 1] and is monotone as c shrinks.
        let mut prev = 0.0;
        let mut c = a + b;
        while c >= 1.0 {
            let f = obscuration_discs(a, b, c);
            assert!((0.0..=1.0).contains(&f));
            assert!(f >= prev - 1e-12);
            prev = f;
            c -= 0.01;
        }
        // The smaller disc fully inside: ratio of areas.
        assert_abs_diff_eq!(obscuration_discs(a, b, 0.0), (b * b) / (a * a), epsilon = 1e-12);
        // Larger disc covers fully.
        assert_abs_diff_eq!(obscuration_discs(2.0, 3.0, 0.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn full_moon_is_brighter_than_quarter() {
        let full = moon_magnitude(2.0, 1.0, 385_000.6 / crate::constants::KM_PER_AU);
        let quarter = moon_magnitude(90.0, 1.0, 385_000.6 / crate::constants::KM_PER_AU);
        assert!(full < quarter - 2.0);
    }

    #[test]
    fn moon_magnitude_monotone_in_phase() {
        let mean = 385_000.6 / crate::constants::KM_PER_AU;
        let mut prev = moon_magnitude(0.5, 1.0, mean);
        let mut phase = 1.0;
        while phase < 179.0 {
            let mag = moon_magnitude(phase, 1.0, mean);
            assert!(mag > prev);
            prev = mag;
            phase += 1.0;
        }
    }

    #[test]
    fn venus_magnitude_realistic() {
        // Near greatest brilliance Venus is about magnitude -4.5.
        let mag = planet_magnitude(Body::Venus, 90.0, 0.72, 0.7).unwrap();
        assert!(mag < -3.5 && mag > -5.5, "venus magnitude {mag}");
    }

    #[test]
    fn illumination_rejects_earth() {
        let almanac = Almanac::new();
        assert!(almanac
            .illumination(Body::Earth, AstroTime::from_ut(0.0))
            .is_err());
    }
}
