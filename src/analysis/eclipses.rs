/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Shadow-cone geometry and the lunar and solar eclipse searches.

use log::debug;

use super::search::{search, SearchOptions};
use crate::almanac::Almanac;
use crate::astro::obscuration_discs;
use crate::constants::{
    DEG2RAD, EARTH_ECLIPSE_RADIUS_KM, EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING,
    EARTH_FLATTENING_SQUARED, KM_PER_AU, MOON_MEAN_RADIUS_KM, RAD2DEG, SUN_RADIUS_KM,
};
use crate::ephemerides::Body;
use crate::errors::{AlmagestResult, NonConvergentSnafu, SearchFailedSnafu};
use crate::math::angle_between;
use crate::math::vectors::AstroVector;
use crate::math::Vector3;
use crate::observers::{Observer, Refraction};
use crate::orientations::{gyration, sidereal_time, PrecessDirection};
use crate::time::AstroTime;

/// Geometry of a shadow cast by a Sun-lit body, evaluated at the plane
/// through a target point perpendicular to the shadow axis.
#[derive(Copy, Clone, Debug)]
pub struct ShadowInfo {
    pub time: AstroTime,
    /// Fractional distance along the axis from the casting body to the
    /// target plane.
    pub u: f64,
    /// Perpendicular distance from the target to the axis, km.
    pub r: f64,
    /// Umbra radius at the plane, km; negative means the antumbra (annular
    /// geometry).
    pub k: f64,
    /// Penumbra radius at the plane, km.
    pub p: f64,
    /// Target point relative to the casting body, AU.
    pub target: Vector3,
    /// Heliocentric position of the casting body, AU.
    pub dir: Vector3,
}

/// Classification shared by lunar and solar eclipses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EclipseKind {
    Penumbral,
    Partial,
    Annular,
    Total,
}

/// A lunar eclipse: peak time, semidurations of each phase in minutes, and
/// the umbral obscuration of the lunar disc.
#[derive(Copy, Clone, Debug)]
pub struct LunarEclipseInfo {
    pub kind: EclipseKind,
    /// Fraction of the Moon's disc inside the umbra at peak.
    pub obscuration: f64,
    pub peak: AstroTime,
    /// Semiduration of the penumbral phase, minutes.
    pub sd_penum: f64,
    /// Semiduration of the partial phase, minutes; 0 when not partial.
    pub sd_partial: f64,
    /// Semiduration of totality, minutes; 0 when not total.
    pub sd_total: f64,
}

/// A solar eclipse somewhere on Earth.
#[derive(Copy, Clone, Debug)]
pub struct GlobalSolarEclipseInfo {
    pub kind: EclipseKind,
    /// Disc obscuration at the ground point: 1 for total, computed for
    /// annular, undefined for partial (it varies with the observer).
    pub obscuration: Option<f64>,
    pub peak: AstroTime,
    /// Shadow-axis distance from the Earth's center at peak, km.
    pub distance: f64,
    /// Geographic coordinates where the axis meets the surface, when it does.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One contact event of a local eclipse, with the Sun's refracted altitude.
#[derive(Copy, Clone, Debug)]
pub struct EclipseEvent {
    pub time: AstroTime,
    pub altitude: f64,
}

/// A solar eclipse as seen by one observer.
#[derive(Copy, Clone, Debug)]
pub struct LocalSolarEclipseInfo {
    pub kind: EclipseKind,
    /// Disc obscuration at peak for this observer.
    pub obscuration: f64,
    pub partial_begin: EclipseEvent,
    pub total_begin: Option<EclipseEvent>,
    pub peak: EclipseEvent,
    pub total_end: Option<EclipseEvent>,
    pub partial_end: EclipseEvent,
}

/// Core shadow-cone evaluation: target and dir as in the specializations
/// below.
fn calc_shadow(
    body_radius_km: f64,
    time: AstroTime,
    target: Vector3,
    dir: Vector3,
) -> ShadowInfo {
    let u = dir.dot(&target) / dir.dot(&dir);
    let dx = (dir * u) - target;
    let r = KM_PER_AU * dx.norm();
    let k = SUN_RADIUS_KM - (1.0 + u) * (SUN_RADIUS_KM - body_radius_km);
    let p = -SUN_RADIUS_KM + (1.0 + u) * (SUN_RADIUS_KM + body_radius_km);
    ShadowInfo {
        time,
        u,
        r,
        k,
        p,
        target,
        dir,
    }
}

impl Almanac {
    /// The Earth's shadow relative to the geocentric Moon.
    pub fn earth_shadow(&self, time: AstroTime) -> AlmagestResult<ShadowInfo> {
        let earth = self.helio_vector(Body::Earth, time)?;
        let moon = self.geo_moon(time);
        Ok(calc_shadow(
            EARTH_ECLIPSE_RADIUS_KM,
            time,
            moon.pos,
            earth.pos,
        ))
    }

    /// The Moon's shadow relative to the lunacentric Earth.
    pub fn moon_shadow(&self, time: AstroTime) -> AlmagestResult<ShadowInfo> {
        let earth = self.helio_vector(Body::Earth, time)?;
        let moon = self.geo_moon(time);
        Ok(calc_shadow(
            MOON_MEAN_RADIUS_KM,
            time,
            -moon.pos,
            earth.pos + moon.pos,
        ))
    }

    /// The Moon's shadow relative to an observer on Earth.
    pub fn local_moon_shadow(
        &self,
        time: AstroTime,
        observer: &Observer,
    ) -> AlmagestResult<ShadowInfo> {
        let earth = self.helio_vector(Body::Earth, time)?;
        let moon = self.geo_moon(time);
        let obs = self.observer_vector(time, observer, false);
        Ok(calc_shadow(
            MOON_MEAN_RADIUS_KM,
            time,
            obs.pos - moon.pos,
            earth.pos + moon.pos,
        ))
    }

    /// A planet's shadow relative to the Earth, for transits.
    pub fn planet_shadow(
        &self,
        body: Body,
        planet_radius_km: f64,
        time: AstroTime,
    ) -> AlmagestResult<ShadowInfo> {
        let geo = self.geo_vector(body, time, false)?;
        let helio = self.helio_vector(body, time)?;
        Ok(calc_shadow(planet_radius_km, time, -geo.pos, helio.pos))
    }

    /// Refines the time of minimum axis distance near `center` by zeroing
    /// the numerical slope of the distance.
    pub(crate) fn peak_shadow<F>(&self, shadow_fn: F, center: AstroTime, window: f64) -> AlmagestResult<ShadowInfo>
    where
        F: Fn(&Almanac, AstroTime) -> AlmagestResult<ShadowInfo>,
    {
        let slope = |t: AstroTime| -> AlmagestResult<f64> {
            let dt = 1.0 / 86400.0;
            let before = shadow_fn(self, self.time_add_days(t, -dt))?;
            let after = shadow_fn(self, self.time_add_days(t, dt))?;
            Ok((after.r - before.r) / dt)
        };
        let t1 = self.time_add_days(center, -window);
        let t2 = self.time_add_days(center, window);
        let peak_time = search(slope, t1, t2, SearchOptions::with_tolerance_seconds(1.0))?
            .ok_or_else(|| {
                SearchFailedSnafu {
                    action: "finding the shadow minimum near a syzygy",
                }
                .build()
            })?;
        shadow_fn(self, peak_time)
    }

    /// Half-length of the phase during which the Earth-shadow axis distance
    /// stays below `radius_limit`, in minutes, bisected within
    /// `window_minutes` on both sides of `center`.
    fn shadow_semi_duration(
        &self,
        center: AstroTime,
        radius_limit: f64,
        window_minutes: f64,
    ) -> AlmagestResult<f64> {
        let window = window_minutes / 1440.0;
        let before = self.time_add_days(center, -window);
        let after = self.time_add_days(center, window);
        let t1 = search(
            |t| Ok(-(self.earth_shadow(t)?.r - radius_limit)),
            before,
            center,
            SearchOptions::with_tolerance_seconds(1.0),
        )?;
        let t2 = search(
            |t| Ok(self.earth_shadow(t)?.r - radius_limit),
            center,
            after,
            SearchOptions::with_tolerance_seconds(1.0),
        )?;
        match (t1, t2) {
            (Some(t1), Some(t2)) => Ok((t2.ut - t1.ut) * (1440.0 / 2.0)),
            _ => SearchFailedSnafu {
                action: "bisecting an eclipse phase duration",
            }
            .fail(),
        }
    }

    /// Finds the first lunar eclipse at or after `start`.
    ///
    /// Walks full moons, prunes by the Moon's ecliptic latitude, and gives up
    /// with `NonConvergent` after 12 fruitless full moons.
    pub fn search_lunar_eclipse(&self, start: AstroTime) -> AlmagestResult<LunarEclipseInfo> {
        const PRUNE_LATITUDE: f64 = 1.8;
        let mut fmtime = start;
        for _ in 0..12 {
            let fullmoon = self
                .search_moon_phase(180.0, fmtime, 40.0)?
                .ok_or_else(|| {
                    SearchFailedSnafu {
                        action: "bracketing the next full moon",
                    }
                    .build()
                })?;
            let eclip_lat = self.ecliptic_geo_moon(fullmoon).geo_eclip_lat;
            if eclip_lat.abs() < PRUNE_LATITUDE {
                let shadow = self.peak_shadow(Almanac::earth_shadow, fullmoon, 0.03)?;
                if shadow.r < shadow.p + MOON_MEAN_RADIUS_KM {
                    // This full moon is at least a penumbral eclipse.
                    let mut kind = EclipseKind::Penumbral;
                    let mut sd_partial = 0.0;
                    let mut sd_total = 0.0;
                    let sd_penum = self.shadow_semi_duration(
                        shadow.time,
                        shadow.p + MOON_MEAN_RADIUS_KM,
                        200.0,
                    )?;
                    if shadow.r < shadow.k + MOON_MEAN_RADIUS_KM {
                        kind = EclipseKind::Partial;
                        sd_partial = self.shadow_semi_duration(
                            shadow.time,
                            shadow.k + MOON_MEAN_RADIUS_KM,
                            sd_penum,
                        )?;
                        if shadow.r + MOON_MEAN_RADIUS_KM < shadow.k {
                            kind = EclipseKind::Total;
                            sd_total = self.shadow_semi_duration(
                                shadow.time,
                                shadow.k - MOON_MEAN_RADIUS_KM,
                                sd_partial,
                            )?;
                        }
                    }
                    let obscuration = if kind == EclipseKind::Total {
                        1.0
                    } else {
                        obscuration_discs(MOON_MEAN_RADIUS_KM, shadow.k, shadow.r)
                    };
                    return Ok(LunarEclipseInfo {
                        kind,
                        obscuration,
                        peak: shadow.time,
                        sd_penum,
                        sd_partial,
                        sd_total,
                    });
                }
            }
            debug!("full moon at {fullmoon} is not eclipsed, advancing");
            fmtime = self.time_add_days(fullmoon, 10.0);
        }
        NonConvergentSnafu {
            iter: 12usize,
            action: "searching 12 full moons for a lunar eclipse",
        }
        .fail()
    }

    /// The lunar eclipse after the one that peaked at `prev_time`.
    pub fn next_lunar_eclipse(&self, prev_time: AstroTime) -> AlmagestResult<LunarEclipseInfo> {
        self.search_lunar_eclipse(self.time_add_days(prev_time, 10.0))
    }

    /// Finds the first solar eclipse visible anywhere on Earth at or after
    /// `start`.
    pub fn search_global_solar_eclipse(
        &self,
        start: AstroTime,
    ) -> AlmagestResult<GlobalSolarEclipseInfo> {
        const PRUNE_LATITUDE: f64 = 1.8;
        let mut nmtime = start;
        for _ in 0..12 {
            let newmoon = self.search_moon_phase(0.0, nmtime, 40.0)?.ok_or_else(|| {
                SearchFailedSnafu {
                    action: "bracketing the next new moon",
                }
                .build()
            })?;
            let eclip_lat = self.ecliptic_geo_moon(newmoon).geo_eclip_lat;
            if eclip_lat.abs() < PRUNE_LATITUDE {
                let shadow = self.peak_shadow(Almanac::moon_shadow, newmoon, 0.03)?;
                if shadow.r < shadow.p + EARTH_ECLIPSE_RADIUS_KM {
                    return self.geoid_intersect(&shadow);
                }
            }
            debug!("new moon at {newmoon} casts no shadow on Earth, advancing");
            nmtime = self.time_add_days(newmoon, 10.0);
        }
        NonConvergentSnafu {
            iter: 12usize,
            action: "searching 12 new moons for a solar eclipse",
        }
        .fail()
    }

    /// The global solar eclipse after the one that peaked at `prev_time`.
    pub fn next_global_solar_eclipse(
        &self,
        prev_time: AstroTime,
    ) -> AlmagestResult<GlobalSolarEclipseInfo> {
        self.search_global_solar_eclipse(self.time_add_days(prev_time, 10.0))
    }

    /// Intersects the lunar shadow axis with the oblate Earth and classifies
    /// the eclipse at the ground point.
    fn geoid_intersect(&self, shadow: &ShadowInfo) -> AlmagestResult<GlobalSolarEclipseInfo> {
        let time = shadow.time;
        let mut kind = EclipseKind::Partial;
        let mut obscuration = None;
        let mut latitude = None;
        let mut longitude = None;

        // Work in the equator-of-date frame so the Earth is axis-aligned,
        // then stretch z to turn the ellipsoid into a sphere.
        let into_date =
            |v: &Vector3| gyration(&AstroVector::from_vector3(*v, time), time, PrecessDirection::From2000).pos;
        let mut v = into_date(&shadow.dir) * KM_PER_AU;
        let mut e = into_date(&shadow.target) * KM_PER_AU;
        let inv_f = 1.0 / EARTH_FLATTENING;
        v.z *= inv_f;
        e.z *= inv_f;

        // |u v - e|^2 = R^2 as a quadratic in u; the smaller root is on the
        // day side of the Earth.
        let radius = EARTH_EQUATORIAL_RADIUS_KM;
        let a = v.dot(&v);
        let b = -2.0 * v.dot(&e);
        let c = e.dot(&e) - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc > 0.0 {
            let u = (-b - disc.sqrt()) / (2.0 * a);
            let px = u * v.x - e.x;
            let py = u * v.y - e.y;
            let pz = (u * v.z - e.z) * EARTH_FLATTENING;

            let proj = px.hypot(py);
            let lat = if proj == 0.0 {
                if pz > 0.0 {
                    90.0
                } else {
                    -90.0
                }
            } else {
                RAD2DEG * (pz / (EARTH_FLATTENING_SQUARED * proj)).atan()
            };
            let gast = sidereal_time(time);
            let mut lon = (RAD2DEG * py.atan2(px) - 15.0 * gast) % 360.0;
            if lon <= -180.0 {
                lon += 360.0;
            } else if lon > 180.0 {
                lon -= 360.0;
            }
            latitude = Some(lat);
            longitude = Some(lon);

            // Classify at the surface point. The 14 m bias on the umbra
            // radius reproduces the Espenak total/annular boundary cases.
            let observer = Observer {
                latitude: lat,
                longitude: lon,
                height: 0.0,
            };
            let surface = self.local_moon_shadow(time, &observer)?;
            if surface.k > 0.014 {
                kind = EclipseKind::Total;
                obscuration = Some(1.0);
            } else {
                kind = EclipseKind::Annular;
                let hm = self.helio_vector(Body::Moon, time)?.pos;
                let lo = surface.target;
                obscuration = Some(solar_eclipse_obscuration(&hm, &lo));
            }
        }

        Ok(GlobalSolarEclipseInfo {
            kind,
            obscuration,
            peak: time,
            distance: shadow.r,
            latitude,
            longitude,
        })
    }

    /// Finds the first solar eclipse visible to a specific observer at or
    /// after `start`. Eclipses entirely below the observer's horizon are
    /// skipped.
    pub fn search_local_solar_eclipse(
        &self,
        start: AstroTime,
        observer: &Observer,
    ) -> AlmagestResult<LocalSolarEclipseInfo> {
        const PRUNE_LATITUDE: f64 = 1.8;
        // A given observer can wait years between eclipses; 200 new moons is
        // about 16 years, comfortably past the longest gap.
        let mut nmtime = start;
        for _ in 0..200 {
            let newmoon = self.search_moon_phase(0.0, nmtime, 40.0)?.ok_or_else(|| {
                SearchFailedSnafu {
                    action: "bracketing the next new moon",
                }
                .build()
            })?;
            let eclip_lat = self.ecliptic_geo_moon(newmoon).geo_eclip_lat;
            if eclip_lat.abs() < PRUNE_LATITUDE {
                let shadow = self.peak_shadow(
                    |almanac, t| almanac.local_moon_shadow(t, observer),
                    newmoon,
                    0.2,
                )?;
                if shadow.r < shadow.p {
                    let eclipse = self.local_eclipse_from_peak(&shadow, observer)?;
                    // Ignore an eclipse that happens entirely at night.
                    let highest = eclipse
                        .peak
                        .altitude
                        .max(eclipse.partial_begin.altitude)
                        .max(eclipse.partial_end.altitude);
                    if highest >= 0.0 {
                        return Ok(eclipse);
                    }
                    debug!("eclipse of {} is below the horizon, advancing", shadow.time);
                }
            }
            nmtime = self.time_add_days(newmoon, 10.0);
        }
        NonConvergentSnafu {
            iter: 200usize,
            action: "searching 200 new moons for a local solar eclipse",
        }
        .fail()
    }

    fn local_eclipse_event(
        &self,
        time: AstroTime,
        observer: &Observer,
    ) -> AlmagestResult<EclipseEvent> {
        let equ = self.equator(Body::Sun, time, observer, true, true)?;
        let hor = self.horizontal(time, observer, equ.ra, equ.dec, Refraction::Normal);
        Ok(EclipseEvent {
            time,
            altitude: hor.altitude,
        })
    }

    fn local_eclipse_from_peak(
        &self,
        peak: &ShadowInfo,
        observer: &Observer,
    ) -> AlmagestResult<LocalSolarEclipseInfo> {
        // Penumbral contact scalar ascends entering the penumbra.
        let partial_scalar = |t: AstroTime| -> AlmagestResult<f64> {
            let s = self.local_moon_shadow(t, observer)?;
            Ok(s.p - s.r)
        };
        let total_scalar = |t: AstroTime| -> AlmagestResult<f64> {
            let s = self.local_moon_shadow(t, observer)?;
            Ok(s.k.abs() - s.r)
        };

        let window = 0.2;
        let t_before = self.time_add_days(peak.time, -window);
        let t_after = self.time_add_days(peak.time, window);
        let partial_begin = search(
            partial_scalar,
            t_before,
            peak.time,
            SearchOptions::with_tolerance_seconds(1.0),
        )?
        .ok_or_else(|| {
            SearchFailedSnafu {
                action: "finding first penumbral contact",
            }
            .build()
        })?;
        let partial_end = search(
            |t| Ok(-partial_scalar(t)?),
            peak.time,
            t_after,
            SearchOptions::with_tolerance_seconds(1.0),
        )?
        .ok_or_else(|| {
            SearchFailedSnafu {
                action: "finding last penumbral contact",
            }
            .build()
        })?;

        let (total_begin, total_end, kind) = if peak.r < peak.k.abs() {
            let window = 0.01;
            let t_before = self.time_add_days(peak.time, -window);
            let t_after = self.time_add_days(peak.time, window);
            let begin = search(
                total_scalar,
                t_before,
                peak.time,
                SearchOptions::with_tolerance_seconds(1.0),
            )?
            .ok_or_else(|| {
                SearchFailedSnafu {
                    action: "finding second contact",
                }
                .build()
            })?;
            let end = search(
                |t| Ok(-total_scalar(t)?),
                peak.time,
                t_after,
                SearchOptions::with_tolerance_seconds(1.0),
            )?
            .ok_or_else(|| {
                SearchFailedSnafu {
                    action: "finding third contact",
                }
                .build()
            })?;
            let kind = if peak.k > 0.0 {
                EclipseKind::Total
            } else {
                EclipseKind::Annular
            };
            (
                Some(self.local_eclipse_event(begin, observer)?),
                Some(self.local_eclipse_event(end, observer)?),
                kind,
            )
        } else {
            (None, None, EclipseKind::Partial)
        };

        let obscuration = if kind == EclipseKind::Total {
            1.0
        } else {
            let hm = self.helio_vector(Body::Moon, peak.time)?.pos;
            solar_eclipse_obscuration(&hm, &peak.target)
        };

        Ok(LocalSolarEclipseInfo {
            kind,
            obscuration,
            partial_begin: self.local_eclipse_event(partial_begin, observer)?,
            total_begin,
            peak: self.local_eclipse_event(peak.time, observer)?,
            total_end,
            partial_end: self.local_eclipse_event(partial_end, observer)?,
        })
    }
}

/// Disc obscuration of the Sun by the Moon for an observer: apparent angular
/// radii against the angular separation, through the two-disc overlap.
///
/// `helio_moon` is the heliocentric Moon and `lunacentric_observer` the
/// observer relative to the Moon, both in AU.
fn solar_eclipse_obscuration(helio_moon: &Vector3, lunacentric_observer: &Vector3) -> f64 {
    // Observer relative to the Sun.
    let helio_observer = helio_moon + lunacentric_observer;
    let sun_radius = (SUN_RADIUS_KM / (KM_PER_AU * helio_observer.norm())).asin();
    let moon_radius = (MOON_MEAN_RADIUS_KM / (KM_PER_AU * lunacentric_observer.norm())).asin();
    let sep = angle_between(&(-helio_observer), &(-lunacentric_observer)) * DEG2RAD;
    obscuration_discs(sun_radius, moon_radius, sep).min(1.0)
}

#[cfg(test)]
mod ut_eclipses {
    use super::*;

    #[test]
    fn shadow_cone_geometry() {
        // At the Moon's distance the Earth's umbra is roughly 4700 km in
        // radius and its penumbra roughly 8100 km.
        let almanac = Almanac::new();
        let time = AstroTime::from_civil(2019, 1, 21, 5, 12, 0.0);
        let shadow = almanac.earth_shadow(time).unwrap();
        assert!(shadow.k > 4200.0 && shadow.k < 4900.0, "umbra {}", shadow.k);
        assert!(shadow.p > 7600.0 && shadow.p < 8600.0, "penumbra {}", shadow.p);
        assert!(shadow.u > 0.0 && shadow.u < 0.01);
    }

    #[test]
    fn moon_shadow_annular_vs_total() {
        // The Moon's umbra reaches the Earth's distance only when the Moon is
        // near perigee, so walking new moons through a full moon cycle
        // (about 14 lunations) must show the umbra radius k with both signs.
        let almanac = Almanac::new();
        let mut seen_positive = false;
        let mut seen_negative = false;
        let mut t = AstroTime::from_ut(7000.0);
        for _ in 0..14 {
            let newmoon = almanac
                .search_moon_phase(0.0, t, 40.0)
                .unwrap()
                .expect("one new moon per synodic month");
            let s = almanac.moon_shadow(newmoon).unwrap();
            if s.k > 0.0 {
                seen_positive = true;
            } else {
                seen_negative = true;
            }
            t = newmoon.add_days(10.0);
        }
        assert!(seen_positive && seen_negative);
    }

    #[test]
    fn obscuration_helper_bounded() {
        let almanac = Almanac::new();
        let time = AstroTime::from_civil(2017, 8, 21, 18, 25, 0.0);
        let hm = almanac.helio_vector(Body::Moon, time).unwrap().pos;
        let moon = almanac.geo_moon(time).pos;
        let f = solar_eclipse_obscuration(&hm, &(-moon));
        assert!((0.0..=1.0).contains(&f));
    }
}
