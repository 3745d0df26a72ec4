/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Event searches: everything built on top of the generic zero finder.

pub mod apsis;
pub mod eclipses;
pub mod elongation;
pub mod longitudes;
pub mod riseset;
pub mod search;
pub mod transits;

pub use apsis::{ApsisEvent, ApsisKind};
pub use eclipses::{
    EclipseEvent, EclipseKind, GlobalSolarEclipseInfo, LocalSolarEclipseInfo, LunarEclipseInfo,
    ShadowInfo,
};
pub use elongation::{ElongationInfo, Visibility};
pub use longitudes::{MoonQuarter, NodeEvent, NodeEventKind, SeasonsInfo};
pub use riseset::{CrossingDirection, HourAngleInfo};
pub use search::{search, SearchOptions};
pub use transits::TransitInfo;
