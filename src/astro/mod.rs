/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Angular coordinate types returned by the observation pipeline.

use crate::math::vectors::AstroVector;

pub mod illumination;

pub use illumination::{obscuration_discs, IlluminationInfo};

/// Equatorial coordinates with the Cartesian vector they came from.
#[derive(Copy, Clone, Debug)]
pub struct Equatorial {
    /// Right ascension in sidereal hours, [0, 24).
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
    /// Distance in AU.
    pub dist: f64,
    /// The equatorial Cartesian vector, AU.
    pub vec: AstroVector,
}

/// Horizontal coordinates of a sky position for a specific observer.
#[derive(Copy, Clone, Debug)]
pub struct Horizontal {
    /// Azimuth in degrees east of north, [0, 360).
    pub azimuth: f64,
    /// Altitude above the horizon in degrees, refraction included when
    /// requested.
    pub altitude: f64,
    /// Right ascension in sidereal hours, lifted through refraction when it
    /// applies.
    pub ra: f64,
    /// Declination in degrees, lifted through refraction when it applies.
    pub dec: f64,
}

/// Ecliptic coordinates (true ecliptic of date).
#[derive(Copy, Clone, Debug)]
pub struct EclipticCoords {
    /// The ecliptic Cartesian vector, AU.
    pub vec: AstroVector,
    /// Ecliptic latitude in degrees.
    pub elat: f64,
    /// Ecliptic longitude in degrees, [0, 360).
    pub elon: f64,
}
