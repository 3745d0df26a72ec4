/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

/// Returns the provided angle bounded between 0.0 and 360.0.
///
/// This function takes an angle (in degrees) and normalizes it to the range [0, 360).
/// If the angle is negative, it will be converted to a positive angle in the equivalent position.
/// For example, an angle of -90 degrees will be converted to 270 degrees.
pub fn between_0_360(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Returns the provided angle bounded between -180.0 (exclusive) and +180.0 (inclusive).
pub fn between_pm_180(angle: f64) -> f64 {
    let bounded = angle.rem_euclid(360.0);
    if bounded > 180.0 {
        bounded - 360.0
    } else {
        bounded
    }
}

/// Returns the provided hour value bounded between 0.0 and 24.0.
pub fn between_0_24(hours: f64) -> f64 {
    hours.rem_euclid(24.0)
}

#[cfg(test)]
mod ut_angles {
    use super::*;

    #[test]
    fn test_between_0_360() {
        assert_eq!(between_0_360(361.0), 1.0);
        assert_eq!(between_0_360(-90.0), 270.0);
        assert_eq!(between_0_360(0.0), 0.0);
        assert!(between_0_360(360.0) < 1e-12);
    }

    #[test]
    fn test_between_pm_180() {
        assert_eq!(between_pm_180(270.0), -90.0);
        assert_eq!(between_pm_180(180.0), 180.0);
        assert_eq!(between_pm_180(-180.0), 180.0);
        assert_eq!(between_pm_180(10.0), 10.0);
    }

    #[test]
    fn test_between_0_24() {
        assert_eq!(between_0_24(25.0), 1.0);
        assert_eq!(between_0_24(-1.0), 23.0);
    }
}
