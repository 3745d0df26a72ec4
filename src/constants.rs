/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

/// Speed of light in astronomical units per day.
pub const C_AUDAY: f64 = 173.1446326846693;

/// Kilometers per astronomical unit (IAU 2012 with the DE-405 scaling).
pub const KM_PER_AU: f64 = 1.495_978_706_909_893_2e8;

/// Astronomical units per light-year.
pub const AU_PER_LY: f64 = 63_241.077_088_075_46;

/// Earth equatorial radius in kilometers (WGS-84).
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.1366;

/// Ratio of the Earth polar radius to its equatorial radius (WGS-84).
pub const EARTH_FLATTENING: f64 = 0.996_647_180_302_104;

pub const EARTH_FLATTENING_SQUARED: f64 = EARTH_FLATTENING * EARTH_FLATTENING;

pub const EARTH_POLAR_RADIUS_KM: f64 = EARTH_EQUATORIAL_RADIUS_KM * EARTH_FLATTENING;

/// Effective Earth radius for eclipse geometry, accounting for the umbral
/// enlargement by the atmosphere.
pub const EARTH_ECLIPSE_RADIUS_KM: f64 = 6371.0;

pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

pub const SUN_RADIUS_KM: f64 = 695_700.0;

pub const MOON_MEAN_RADIUS_KM: f64 = 1737.4;

pub const MOON_EQUATORIAL_RADIUS_KM: f64 = 1738.1;

/// Sidereal rotation rate of the Earth in radians per second.
pub const ANGVEL: f64 = 7.292_115_0e-5;

pub const SOLAR_DAYS_PER_SIDEREAL_DAY: f64 = 0.997_269_571_759_259_2;

pub const MEAN_SYNODIC_MONTH: f64 = 29.530_588;

/// Refraction at the visible horizon in degrees, at standard density.
pub const REFRACTION_NEAR_HORIZON: f64 = 34.0 / 60.0;

pub const DEG2RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD2DEG: f64 = 180.0 / core::f64::consts::PI;
pub const HOUR2RAD: f64 = core::f64::consts::PI / 12.0;
pub const RAD2HOUR: f64 = 12.0 / core::f64::consts::PI;

/// Arcseconds in a full turn.
pub const ASEC360: f64 = 1_296_000.0;
pub const ASEC2RAD: f64 = DEG2RAD / 3600.0;
/// Arcseconds per radian.
pub const ARC: f64 = 3600.0 * RAD2DEG;

/// Gravitational parameters, GM, in au^3 / day^2.
///
/// Values follow the DE-405 / DE-441 mass parameters expressed in AU and days.
pub mod gm {
    pub const SUN_GM: f64 = 0.295_912_208_285_591_1e-03;
    pub const MERCURY_GM: f64 = 0.491_254_745_145_081_2e-10;
    pub const VENUS_GM: f64 = 0.724_345_248_616_270_3e-09;
    pub const EARTH_GM: f64 = 0.888_769_239_011_350_9e-09;
    pub const MARS_GM: f64 = 0.954_953_510_577_925_8e-10;
    pub const JUPITER_GM: f64 = 0.282_534_590_952_422_6e-06;
    pub const SATURN_GM: f64 = 0.845_971_518_568_065_9e-07;
    pub const URANUS_GM: f64 = 0.129_202_491_678_196_9e-07;
    pub const NEPTUNE_GM: f64 = 0.152_435_890_078_427_6e-07;
    pub const PLUTO_GM: f64 = 0.218_869_976_542_597_0e-11;
    /// Earth GM divided by the Earth/Moon mass ratio 81.30056822149722.
    pub const MOON_GM: f64 = 1.093_189_455_441_402_0e-11;
}

/// Sidereal orbital periods in days.
pub mod periods {
    pub const MERCURY_ORBITAL_PERIOD: f64 = 87.969;
    pub const VENUS_ORBITAL_PERIOD: f64 = 224.701;
    pub const EARTH_ORBITAL_PERIOD: f64 = 365.256;
    pub const MARS_ORBITAL_PERIOD: f64 = 686.980;
    pub const JUPITER_ORBITAL_PERIOD: f64 = 4332.589;
    pub const SATURN_ORBITAL_PERIOD: f64 = 10759.22;
    pub const URANUS_ORBITAL_PERIOD: f64 = 30685.4;
    pub const NEPTUNE_ORBITAL_PERIOD: f64 = 60189.0;
    pub const PLUTO_ORBITAL_PERIOD: f64 = 90560.0;
}
