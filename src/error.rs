// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for solving, editing and compiling curves.
//!
//! Library calls return these to the caller. The edit session is the one
//! place that absorbs them: a failed recompile keeps the previous function
//! and raises the session's error flag instead.

use thiserror::Error;

/// Errors raised by the solver, the path model and the compiler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// A unit Bezier was built with a control point x outside [0, 1]
    #[error("control point x must lie in [0, 1] (x1 = {x1}, x2 = {x2})")]
    InvalidControlPoints { x1: f64, x2: f64 },

    /// Point insertion on a path without segments
    #[error("path has no segments")]
    EmptyPath,

    /// The compiled function produced an unusable value
    #[error("compiled function failed validation at t = {t}: {reason}")]
    CompileValidation { t: f64, reason: String },
}

impl CurveError {
    pub(crate) fn validation(t: f64, reason: impl Into<String>) -> Self {
        CurveError::CompileValidation {
            t,
            reason: reason.into(),
        }
    }
}
