/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use snafu::prelude::*;

use crate::ephemerides::Body;

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AlmagestError {
    #[snafu(display("{msg}: {value}"))]
    Domain { msg: &'static str, value: f64 },
    #[snafu(display("did not converge after {iter} iterations while {action}"))]
    NonConvergent { iter: usize, action: &'static str },
    #[snafu(display("bracket has no ascending zero crossing while {action}"))]
    SearchFailed { action: &'static str },
    #[snafu(display("body {body} is not supported when {action}"))]
    UnsupportedBody { body: Body, action: &'static str },
    /// If this is raised, please report a bug.
    #[snafu(display("internal invariant violated while {action} -- please report a bug"))]
    Internal { action: &'static str },
}

pub type AlmagestResult<T> = Result<T, AlmagestError>;
