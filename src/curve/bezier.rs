// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Inverse evaluation of unit cubic Beziers.
//!
//! A `UnitBezier` is the easing-style cubic that starts at (0, 0), ends at
//! (1, 1) and is shaped by two control points (x1, y1) and (x2, y2).
//! Evaluating it for an input `x` means finding the parameter `t` with
//! `X(t) = x` and returning `Y(t)`.
//!
//! The parameter search starts from an 11-entry table of X values at
//! t = 0, 0.1, ..., 1. Inside the bracketing interval a linear guess is
//! refined with Newton-Raphson when the curve is steep enough, or with
//! bisection when the tangent is close to vertical in t. Both loops are
//! bounded, so evaluation cost does not depend on the input.

use crate::error::CurveError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Entries in the X lookup table (t = 0.0 ..= 1.0 in steps of 0.1)
pub(crate) const TABLE_SIZE: usize = 11;

/// Parametric distance between two table entries
const TABLE_STEP: f64 = 1.0 / (TABLE_SIZE as f64 - 1.0);

/// Newton-Raphson refinement steps
pub(crate) const NEWTON_ITERATIONS: usize = 4;

/// Below this slope Newton-Raphson is unreliable and bisection takes over
pub(crate) const NEWTON_MIN_SLOPE: f64 = 0.001;

/// Bisection stops once |X(t) - x| drops below this
pub(crate) const SUBDIVISION_PRECISION: f64 = 1e-7;

/// Upper bound on bisection steps
pub(crate) const SUBDIVISION_MAX_ITERATIONS: usize = 10;

// ===== Polynomial helpers =====
//
// One coordinate of the cubic through 0 and 1 with inner control values
// a1 and a2, written in Horner form: ((A t + B) t + C) t.

#[inline]
fn coeff_a(a1: f64, a2: f64) -> f64 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

#[inline]
fn coeff_b(a1: f64, a2: f64) -> f64 {
    3.0 * a2 - 6.0 * a1
}

#[inline]
fn coeff_c(a1: f64) -> f64 {
    3.0 * a1
}

/// Value of the cubic at parameter `t`
#[inline]
fn bezier_at(t: f64, a1: f64, a2: f64) -> f64 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

/// First derivative of the cubic at parameter `t`
#[inline]
fn slope_at(t: f64, a1: f64, a2: f64) -> f64 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

// ===== UnitBezier =====

/// A cubic Bezier from (0, 0) to (1, 1) evaluated as a function of x
#[derive(Debug, Clone, PartialEq)]
pub struct UnitBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    /// X at uniform parameter steps; `None` when the curve is the diagonal
    table: Option<[f64; TABLE_SIZE]>,
}

impl UnitBezier {
    /// Build a solver for the given control points
    ///
    /// Both x coordinates must lie in [0, 1] so that X(t) is monotonic;
    /// the y coordinates are unconstrained.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, CurveError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&x1) || !unit.contains(&x2) {
            return Err(CurveError::InvalidControlPoints { x1, x2 });
        }

        let table = if x1 == y1 && x2 == y2 {
            None
        } else {
            let mut table = [0.0; TABLE_SIZE];
            for (i, entry) in table.iter_mut().enumerate() {
                *entry = bezier_at(i as f64 * TABLE_STEP, x1, x2);
            }
            Some(table)
        };

        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            table,
        })
    }

    /// The control points as (x1, y1, x2, y2)
    pub fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Whether the curve coincides with the identity diagonal
    pub fn is_identity(&self) -> bool {
        self.table.is_none()
    }

    /// Evaluate Y for the given X
    pub fn eval(&self, x: f64) -> f64 {
        let Some(table) = &self.table else {
            return x;
        };
        if x == 0.0 || x == 1.0 {
            return x;
        }
        bezier_at(self.t_for_x(x, table), self.y1, self.y2)
    }

    /// Find the parameter whose X equals `x`
    fn t_for_x(&self, x: f64, table: &[f64; TABLE_SIZE]) -> f64 {
        let last = TABLE_SIZE - 1;
        let mut current = 1;
        while current != last && table[current] <= x {
            current += 1;
        }
        current -= 1;
        let interval_start = current as f64 * TABLE_STEP;

        let span = table[current + 1] - table[current];
        let dist = if span != 0.0 {
            (x - table[current]) / span
        } else {
            0.0
        };
        let guess = interval_start + dist * TABLE_STEP;

        let initial_slope = slope_at(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            self.newton_raphson(x, guess)
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.subdivide(x, interval_start, interval_start + TABLE_STEP)
        }
    }

    fn newton_raphson(&self, x: f64, mut t: f64) -> f64 {
        for _ in 0..NEWTON_ITERATIONS {
            let slope = slope_at(t, self.x1, self.x2);
            if slope == 0.0 {
                return t;
            }
            t -= (bezier_at(t, self.x1, self.x2) - x) / slope;
        }
        t
    }

    fn subdivide(&self, x: f64, mut lo: f64, mut hi: f64) -> f64 {
        let mut iterations = 0;
        loop {
            let t = lo + (hi - lo) / 2.0;
            let error = bezier_at(t, self.x1, self.x2) - x;
            if error > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            iterations += 1;
            if error.abs() <= SUBDIVISION_PRECISION || iterations >= SUBDIVISION_MAX_ITERATIONS {
                return t;
            }
        }
    }
}

/// Build an evaluator for the unit cubic with the given control points
///
/// Convenience wrapper around [`UnitBezier`] for one-off use.
pub fn solve(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<impl Fn(f64) -> f64, CurveError> {
    let bezier = UnitBezier::new(x1, y1, x2, y2)?;
    Ok(move |x| bezier.eval(x))
}

// ===== SolverCache =====

type SolverKey = [u64; 4];

fn solver_key(x1: f64, y1: f64, x2: f64, y2: f64) -> SolverKey {
    [x1.to_bits(), y1.to_bits(), x2.to_bits(), y2.to_bits()]
}

/// Shared solvers keyed by their control points
///
/// Compiling the same path twice, or a path where only some joints changed,
/// reuses the lookup tables of the untouched joints. Entries that were not
/// requested since the last [`SolverCache::sweep`] are dropped by it, which
/// keeps the cache the size of the current curve.
#[derive(Debug, Clone, Default)]
pub struct SolverCache {
    solvers: HashMap<SolverKey, Arc<UnitBezier>>,
    live: HashSet<SolverKey>,
}

impl SolverCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached solvers
    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    /// Whether the cache holds no solvers
    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    /// Fetch the solver for these control points, building it on a miss
    pub fn get_or_build(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<Arc<UnitBezier>, CurveError> {
        let key = solver_key(x1, y1, x2, y2);
        if let Some(solver) = self.solvers.get(&key) {
            self.live.insert(key);
            return Ok(Arc::clone(solver));
        }

        let solver = Arc::new(UnitBezier::new(x1, y1, x2, y2)?);
        tracing::trace!(
            "[SolverCache::get_or_build] miss for ({}, {}, {}, {})",
            x1,
            y1,
            x2,
            y2
        );
        self.solvers.insert(key, Arc::clone(&solver));
        self.live.insert(key);
        Ok(solver)
    }

    /// Drop every solver not requested since the previous sweep
    pub fn sweep(&mut self) {
        let before = self.solvers.len();
        let live = std::mem::take(&mut self.live);
        self.solvers.retain(|key, _| live.contains(key));
        tracing::trace!(
            "[SolverCache::sweep] kept {} of {} solvers",
            self.solvers.len(),
            before
        );
    }
}
