/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use snafu::ensure;

use super::Almanac;
use crate::constants::{AU_PER_LY, DEG2RAD, HOUR2RAD};
use crate::ephemerides::Body;
use crate::errors::{AlmagestResult, DomainSnafu, UnsupportedBodySnafu};
use crate::math::Vector3;

/// A user-defined fixed point on the celestial sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StarDef {
    /// Right ascension in sidereal hours, [0, 24).
    pub ra: f64,
    /// Declination in degrees, [-90, +90].
    pub dec: f64,
    /// Distance from the Sun in AU.
    pub dist_au: f64,
}

impl StarDef {
    /// Heliocentric direction scaled by the star's distance, EQJ.
    pub(crate) fn vector(&self) -> Vector3 {
        let ra = self.ra * HOUR2RAD;
        let dec = self.dec * DEG2RAD;
        Vector3::new(
            self.dist_au * dec.cos() * ra.cos(),
            self.dist_au * dec.cos() * ra.sin(),
            self.dist_au * dec.sin(),
        )
    }
}

impl Almanac {
    /// Defines (or redefines) one of the eight user-star slots.
    ///
    /// # Errors
    /// - `UnsupportedBody` unless `body` is one of `Star1..Star8`;
    /// - `Domain` for RA outside [0, 24), |dec| > 90, or a distance under one
    ///   light-year.
    pub fn define_star(
        &self,
        body: Body,
        ra_hours: f64,
        dec_deg: f64,
        distance_ly: f64,
    ) -> AlmagestResult<()> {
        let slot = body.star_index().ok_or_else(|| {
            UnsupportedBodySnafu {
                body,
                action: "defining a user star",
            }
            .build()
        })?;
        ensure!(
            ra_hours.is_finite() && (0.0..24.0).contains(&ra_hours),
            DomainSnafu {
                msg: "star right ascension must be in [0, 24) sidereal hours",
                value: ra_hours,
            }
        );
        ensure!(
            dec_deg.is_finite() && (-90.0..=90.0).contains(&dec_deg),
            DomainSnafu {
                msg: "star declination must be in [-90, 90] degrees",
                value: dec_deg,
            }
        );
        ensure!(
            distance_ly.is_finite() && distance_ly >= 1.0,
            DomainSnafu {
                msg: "star distance must be at least one light-year",
                value: distance_ly,
            }
        );
        let mut stars = self.stars.write().unwrap();
        stars[slot] = Some(StarDef {
            ra: ra_hours,
            dec: dec_deg,
            dist_au: distance_ly * AU_PER_LY,
        });
        Ok(())
    }

    /// Returns the definition of a user star, if `body` is a defined star.
    pub(crate) fn user_star(&self, body: Body) -> Option<StarDef> {
        let slot = body.star_index()?;
        self.stars.read().unwrap()[slot]
    }
}

#[cfg(test)]
mod ut_stars {
    use crate::almanac::Almanac;
    use crate::ephemerides::Body;

    #[test]
    fn define_and_read_back() {
        let almanac = Almanac::new();
        almanac.define_star(Body::Star1, 6.75, -16.72, 8.6).unwrap();
        let star = almanac.user_star(Body::Star1).unwrap();
        assert_eq!(star.ra, 6.75);
        assert!(almanac.user_star(Body::Star2).is_none());
    }

    #[test]
    fn domain_checks() {
        let almanac = Almanac::new();
        assert!(almanac.define_star(Body::Star1, 24.0, 0.0, 4.2).is_err());
        assert!(almanac.define_star(Body::Star1, 0.0, 90.5, 4.2).is_err());
        // Exactly one light-year is allowed; less is not.
        assert!(almanac.define_star(Body::Star1, 0.0, 0.0, 1.0).is_ok());
        assert!(almanac.define_star(Body::Star1, 0.0, 0.0, 0.999).is_err());
        assert!(almanac.define_star(Body::Moon, 0.0, 0.0, 4.2).is_err());
    }
}
