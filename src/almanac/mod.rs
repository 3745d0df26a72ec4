/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use std::sync::{Arc, Mutex, RwLock};

use crate::ephemerides::pluto::{PlutoSegment, PLUTO_NUM_SEGMENTS};
use crate::time::{AstroTime, CivilTime, DeltaT};

mod stars;
mod topocentric;
pub use stars::StarDef;

/// The computation engine.
///
/// An `Almanac` owns every piece of process-wide mutable state the library
/// needs: the ΔT model selection, the user-defined star table, and the Pluto
/// segment cache. All public computations are methods on this value, so
/// concurrent use only requires sharing a reference.
pub struct Almanac {
    pub(crate) delta_t: DeltaT,
    pub(crate) stars: RwLock<[Option<StarDef>; 8]>,
    pub(crate) pluto_cache: Mutex<Vec<Option<Arc<PlutoSegment>>>>,
}

impl Default for Almanac {
    fn default() -> Self {
        Self::new()
    }
}

impl Almanac {
    pub fn new() -> Self {
        Self {
            delta_t: DeltaT::default(),
            stars: RwLock::new([None; 8]),
            pluto_cache: Mutex::new(vec![None; PLUTO_NUM_SEGMENTS]),
        }
    }

    /// Builds an almanac with a specific ΔT model.
    pub fn with_delta_t(delta_t: DeltaT) -> Self {
        Self {
            delta_t,
            ..Self::new()
        }
    }

    /// Replaces the ΔT model. This invalidates nothing: times minted earlier
    /// keep the `tt` they were built with.
    pub fn set_delta_t(&mut self, delta_t: DeltaT) {
        self.delta_t = delta_t;
    }

    pub fn delta_t(&self) -> DeltaT {
        self.delta_t
    }

    /// Builds a time from a raw UT day offset, honoring the configured ΔT
    /// model.
    pub fn time_from_ut(&self, ut: f64) -> AstroTime {
        AstroTime::from_ut_with(ut, self.delta_t)
    }

    /// Builds a time from a civil UTC moment, honoring the configured ΔT
    /// model.
    pub fn time_from_civil(&self, ct: &CivilTime) -> AstroTime {
        self.time_from_ut(crate::time::ut_from_civil(ct))
    }

    /// Returns a time `days` later, honoring the configured ΔT model.
    pub fn time_add_days(&self, time: AstroTime, days: f64) -> AstroTime {
        time.add_days_with(days, self.delta_t)
    }
}

#[cfg(test)]
mod ut_almanac {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn custom_delta_t_flows_into_times(){
        fn no_op(_ut: f64) -> f64 {
            0.0
        }
        let almanac = Almanac::with_delta_t(DeltaT::Custom(no_op));
        let t = almanac.time_from_ut(100.0);
        assert_abs_diff_eq!(t.tt, t.ut, epsilon = 0.0);
        let later = almanac.time_add_days(t, 5.0);
        assert_abs_diff_eq!(later.tt, 105.0, epsilon = 0.0);
    }

    #[test]
    fn default_model_is_espenak_meeus() {
        let almanac = Almanac::new();
        let a = almanac.time_from_ut(250.0);
        let b = AstroTime::from_ut(250.0);
        assert_eq!(a, b);
    }
}
