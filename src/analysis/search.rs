/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! The generic ascending-zero finder every event search is built on.

use log::trace;

use crate::errors::{AlmagestResult, NonConvergentSnafu};
use crate::time::AstroTime;

/// Tuning for [search].
#[derive(Copy, Clone, Debug)]
pub struct SearchOptions {
    /// Convergence window in seconds of time. Default 1.
    pub dt_tolerance_seconds: f64,
    /// Precomputed value of the scalar at the left endpoint, when the caller
    /// already knows it.
    pub init_f1: Option<f64>,
    /// Precomputed value at the right endpoint.
    pub init_f2: Option<f64>,
    /// Iteration cap. Default 20.
    pub iter_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            dt_tolerance_seconds: 1.0,
            init_f1: None,
            init_f2: None,
            iter_limit: 20,
        }
    }
}

impl SearchOptions {
    pub fn with_tolerance_seconds(dt_tolerance_seconds: f64) -> Self {
        Self {
            dt_tolerance_seconds,
            ..Self::default()
        }
    }
}

/// Shifts both time scales; inside a bracket the ΔT drift is far below the
/// solver tolerance.
fn shift(t: AstroTime, days: f64) -> AstroTime {
    AstroTime {
        ut: t.ut + days,
        tt: t.tt + days,
    }
}

struct QuadResult {
    /// Root time.
    tq: AstroTime,
    /// Slope of the parabola at the root, per day.
    df_dt: f64,
}

/// Fits a parabola through three equally spaced samples and returns its
/// single root inside the bracket, if exactly one exists.
fn quad_interp(tmid: AstroTime, dt: f64, fa: f64, fm: f64, fb: f64) -> Option<QuadResult> {
    let r = (fa + fb) / 2.0 - fm;
    let s = (fb - fa) / 2.0;
    let t = fm;

    let x = if r == 0.0 {
        // Parabola degenerates to a straight line.
        if s == 0.0 {
            return None;
        }
        let x = -t / s;
        if !(-1.0..=1.0).contains(&x) {
            return None;
        }
        x
    } else {
        let u = s * s - 4.0 * r * t;
        if u <= 0.0 {
            return None;
        }
        let ru = u.sqrt();
        let x1 = (-s + ru) / (2.0 * r);
        let x2 = (-s - ru) / (2.0 * r);
        let in1 = (-1.0..=1.0).contains(&x1);
        let in2 = (-1.0..=1.0).contains(&x2);
        match (in1, in2) {
            (true, false) => x1,
            (false, true) => x2,
            // Zero or two roots inside the bracket: ambiguous, give up.
            _ => return None,
        }
    };

    Some(QuadResult {
        tq: shift(tmid, x * dt),
        df_dt: (2.0 * r * x + s) / dt,
    })
}

/// Finds the next time in `[t1, t2]` where `func` crosses from negative to
/// non-negative.
///
/// The function is assumed continuously differentiable with at most one
/// ascending zero-crossing inside the bracket. Each iteration first attempts
/// a quadratic (parabolic) refinement of the bracket; when the parabola is
/// unusable the bracket is bisected instead.
///
/// Returns `Ok(None)` when the bracket contains no ascending crossing, and
/// fails with `NonConvergent` past `options.iter_limit` iterations.
pub fn search<F>(
    mut func: F,
    t1: AstroTime,
    t2: AstroTime,
    options: SearchOptions,
) -> AlmagestResult<Option<AstroTime>>
where
    F: FnMut(AstroTime) -> AlmagestResult<f64>,
{
    let dt_days = (options.dt_tolerance_seconds / 86400.0).abs();
    let mut t1 = t1;
    let mut t2 = t2;
    let mut f1 = match options.init_f1 {
        Some(v) => v,
        None => func(t1)?,
    };
    let mut f2 = match options.init_f2 {
        Some(v) => v,
        None => func(t2)?,
    };

    let mut iter = 0usize;
    let mut calc_fmid = true;
    let mut fmid = 0.0;
    loop {
        iter += 1;
        if iter > options.iter_limit {
            return NonConvergentSnafu {
                iter: options.iter_limit,
                action: "searching for an ascending zero crossing",
            }
            .fail();
        }

        let tmid = AstroTime::interpolate(t1, t2, 0.5);
        if (tmid.ut - t1.ut).abs() < dt_days {
            // Bracket has shrunk below the tolerance.
            return Ok(Some(tmid));
        }

        if calc_fmid {
            fmid = func(tmid)?;
        } else {
            // A previous quadratic pass already evaluated this midpoint.
            calc_fmid = true;
        }

        if let Some(q) = quad_interp(tmid, t2.ut - tmid.ut, f1, fmid, f2) {
            if q.df_dt != 0.0 {
                let fq = func(q.tq)?;
                let dt_guess = (fq / q.df_dt).abs();
                if dt_guess < dt_days {
                    trace!("search converged by quadratic refinement after {iter} iterations");
                    return Ok(Some(q.tq));
                }
                // Try to adopt a tighter bracket around the predicted root.
                let dt_guess = dt_guess * 1.2;
                let tleft = shift(q.tq, -dt_guess);
                let tright = shift(q.tq, dt_guess);
                if (tleft.ut - t1.ut) * (tleft.ut - t2.ut) < 0.0
                    && (tright.ut - t1.ut) * (tright.ut - t2.ut) < 0.0
                {
                    let fleft = func(tleft)?;
                    let fright = func(tright)?;
                    if fleft < 0.0 && fright >= 0.0 {
                        f1 = fleft;
                        t1 = tleft;
                        f2 = fright;
                        t2 = tright;
                        fmid = fq;
                        calc_fmid = false;
                        continue;
                    }
                }
            }
        }

        // Bisect toward whichever half brackets the sign change.
        if f1 < 0.0 && fmid >= 0.0 {
            t2 = tmid;
            f2 = fmid;
            continue;
        }
        if fmid < 0.0 && f2 >= 0.0 {
            t1 = tmid;
            f1 = fmid;
            continue;
        }
        // There is no ascending zero-crossing in this bracket.
        return Ok(None);
    }
}

#[cfg(test)]
mod ut_search {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_linear_root() {
        let t1 = AstroTime::from_ut(0.0);
        let t2 = AstroTime::from_ut(10.0);
        let found = search(|t| Ok(t.ut - 7.25), t1, t2, SearchOptions::default())
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(found.ut, 7.25, epsilon = 1.0 / 86400.0);
    }

    #[test]
    fn finds_sine_root() {
        // sin crosses upward at t = 0 (mod 2 pi); search in [-2, 3].
        let t1 = AstroTime::from_ut(-2.0);
        let t2 = AstroTime::from_ut(3.0);
        let found = search(
            |t| Ok(t.ut.sin()),
            t1,
            t2,
            SearchOptions::with_tolerance_seconds(0.01),
        )
        .unwrap()
        .unwrap();
        assert_abs_diff_eq!(found.ut, 0.0, epsilon = 0.01 / 86400.0 * 2.0);
    }

    #[test]
    fn reports_missing_crossing() {
        let t1 = AstroTime::from_ut(0.0);
        let t2 = AstroTime::from_ut(1.0);
        // Strictly positive function: no crossing.
        let found = search(|t| Ok(t.ut + 10.0), t1, t2, SearchOptions::default()).unwrap();
        assert!(found.is_none());
        // Descending crossing only: also none.
        let found = search(|t| Ok(0.5 - t.ut), t1, t2, SearchOptions::default()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn respects_precomputed_endpoints() {
        let t1 = AstroTime::from_ut(0.0);
        let t2 = AstroTime::from_ut(1.0);
        let mut calls = 0;
        let found = search(
            |t| {
                calls += 1;
                Ok(t.ut - 0.5)
            },
            t1,
            t2,
            SearchOptions {
                init_f1: Some(-0.5),
                init_f2: Some(0.5),
                ..SearchOptions::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_abs_diff_eq!(found.ut, 0.5, epsilon = 1.0 / 86400.0);
        assert!(calls > 0);
    }

    #[test]
    fn iteration_cap_fails() {
        let t1 = AstroTime::from_ut(0.0);
        let t2 = AstroTime::from_ut(1000.0);
        let result = search(
            // A step function the parabola cannot model; bisection needs
            // ~27 halvings to reach 1 second on a 1000 day bracket.
            |t| Ok(if t.ut < 987.654_321 { -1.0 } else { 1.0 }),
            t1,
            t2,
            SearchOptions {
                iter_limit: 5,
                ..SearchOptions::default()
            },
        );
        assert!(result.is_err());
    }
}
