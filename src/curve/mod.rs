// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Curve math shared by the compiler and the sampler

pub mod bezier;

pub use bezier::{SolverCache, UnitBezier, solve};

/// Linearly map `value` from [in_min, in_max] onto [out_min, out_max]
///
/// An empty input range maps everything to `out_min`.
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if in_max - in_min == 0.0 {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}
