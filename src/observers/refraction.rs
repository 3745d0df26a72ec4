/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Atmospheric refraction and the U.S. Standard Atmosphere 1976.

use crate::constants::DEG2RAD;
use crate::errors::{AlmagestResult, DomainSnafu};
use snafu::ensure;

/// Atmospheric refraction handling for apparent altitudes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Refraction {
    /// The standard refraction model, tapered below the horizon.
    #[default]
    Normal,
    /// The same base formula without the below-horizon taper, matching the
    /// JPL Horizons tool.
    JplHor,
    /// No refraction.
    None,
}

/// Refraction correction in degrees to ADD to a true altitude to obtain the
/// apparent altitude.
pub fn refraction(mode: Refraction, altitude: f64) -> f64 {
    if !(-90.0..=90.0).contains(&altitude) {
        return 0.0;
    }
    if mode == Refraction::None {
        return 0.0;
    }
    // Saemundsson's formula, in degrees.
    let hd = altitude.max(-1.0);
    let mut refr = (1.02 / ((hd + 10.3 / (hd + 5.11)) * DEG2RAD).tan()) / 60.0;
    if mode == Refraction::Normal && altitude < -1.0 {
        // Taper linearly to zero at the nadir; the formula has no physical
        // meaning that far below the horizon.
        refr *= (altitude + 90.0) / 89.0;
    }
    refr
}

/// Solves for the correction that, added to the true altitude, yields
/// `bent_altitude`; the returned value is the negative refraction to apply to
/// an apparent altitude.
///
/// Fixed point iteration with a 1e-14 degree tolerance.
pub fn inverse_refraction(mode: Refraction, bent_altitude: f64) -> f64 {
    if !(-90.0..=90.0).contains(&bent_altitude) {
        return 0.0;
    }
    let mut corr = -refraction(mode, bent_altitude);
    for _ in 0..100 {
        let diff = (bent_altitude + corr) + refraction(mode, bent_altitude + corr) - bent_altitude;
        if diff.abs() < 1.0e-14 {
            break;
        }
        corr -= diff;
    }
    corr
}

/// Atmospheric pressure, temperature and relative density from the
/// three-layer U.S. Standard Atmosphere 1976.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atmosphere {
    /// Pressure in pascals.
    pub pressure: f64,
    /// Temperature in kelvins.
    pub temperature: f64,
    /// Density relative to sea level.
    pub density: f64,
}

/// Atmosphere state at `elevation_meters` above (or below) sea level.
///
/// # Errors
/// `Domain` unless the elevation is within [-500, 100000] meters.
pub fn atmosphere(elevation_meters: f64) -> AlmagestResult<Atmosphere> {
    ensure!(
        elevation_meters.is_finite() && (-500.0..=100_000.0).contains(&elevation_meters),
        DomainSnafu {
            msg: "atmosphere elevation must be in [-500, 100000] meters",
            value: elevation_meters,
        }
    );
    const P0: f64 = 101_325.0; // Pa at sea level
    const T0: f64 = 288.15; // K at sea level
    const T1: f64 = 216.65; // K at the tropopause

    let (pressure, temperature) = if elevation_meters < 11_000.0 {
        let t = T0 - 0.0065 * elevation_meters;
        (P0 * (t / T0).powf(5.25577), t)
    } else if elevation_meters < 20_000.0 {
        let p11 = P0 * (T1 / T0).powf(5.25577);
        (
            p11 * (-(elevation_meters - 11_000.0) / 6341.62).exp(),
            T1,
        )
    } else {
        let p11 = P0 * (T1 / T0).powf(5.25577);
        let p20 = p11 * (-9000.0_f64 / 6341.62).exp();
        let t = T1 + 0.001 * (elevation_meters - 20_000.0);
        (p20 * (t / T1).powf(-34.1632), t)
    };
    let density = (pressure / temperature) / (P0 / T0);
    Ok(Atmosphere {
        pressure,
        temperature,
        density,
    })
}

#[cfg(test)]
mod ut_refraction {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn refraction_near_horizon() {
        // Saemundsson gives about 0.48 degrees at the visible horizon.
        let r = refraction(Refraction::Normal, 0.0);
        assert_abs_diff_eq!(r, 0.48, epsilon = 0.02);
        assert_eq!(refraction(Refraction::None, 0.0), 0.0);
    }

    #[test]
    fn inverse_round_trip() {
        for mode in [Refraction::Normal, Refraction::JplHor, Refraction::None] {
            let mut alt = -85.0;
            while alt <= 85.0 {
                let bent = alt + refraction(mode, alt);
                let corr = inverse_refraction(mode, bent);
                assert_abs_diff_eq!(bent + corr, alt, epsilon = 1e-10);
                alt += 1.375;
            }
        }
    }

    #[test]
    fn atmosphere_boundaries() {
        assert!(atmosphere(-500.0).is_ok());
        assert!(atmosphere(100_000.0).is_ok());
        assert!(atmosphere(-500.1).is_err());
        assert!(atmosphere(100_000.1).is_err());
        assert!(atmosphere(f64::NAN).is_err());
    }

    #[test]
    fn atmosphere_sea_level() {
        let atm = atmosphere(0.0).unwrap();
        assert_abs_diff_eq!(atm.pressure, 101_325.0, epsilon = 1.0);
        assert_abs_diff_eq!(atm.temperature, 288.15, epsilon = 1e-9);
        assert_abs_diff_eq!(atm.density, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn atmosphere_decreases_with_height() {
        let mut prev = atmosphere(-500.0).unwrap().density;
        let mut h = 0.0;
        while h <= 100_000.0 {
            let d = atmosphere(h).unwrap().density;
            assert!(d < prev);
            prev = d;
            h += 2500.0;
        }
    }
}
