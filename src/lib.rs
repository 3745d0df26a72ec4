/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

extern crate const_format;
extern crate log;
extern crate nalgebra;

pub mod almanac;
pub mod analysis;
pub mod astro;
pub mod constants;
pub mod ephemerides;
pub mod errors;
pub mod frames;
pub mod math;
pub mod observers;
pub mod orientations;
pub mod time;

pub mod prelude {
    pub use crate::almanac::Almanac;
    pub use crate::analysis::search::SearchOptions;
    pub use crate::astro::{Equatorial, Horizontal};
    pub use crate::ephemerides::Body;
    pub use crate::errors::{AlmagestError, AlmagestResult};
    pub use crate::observers::{Observer, Refraction};
    pub use crate::time::{AstroTime, CivilTime};
}

use const_format::formatcp;

/// Library version, exposed so downstream tooling can report what produced a result.
pub const ALMAGEST_VERSION: &str = formatcp!(
    "{}.{}.{}",
    env!("CARGO_PKG_VERSION_MAJOR"),
    env!("CARGO_PKG_VERSION_MINOR"),
    env!("CARGO_PKG_VERSION_PATCH")
);
