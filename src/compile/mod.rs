// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Path to function compilation.
//!
//! [`FunctionCompiler`] walks a path joint by joint and builds a
//! [`CompiledCurve`] (the executable form) plus its two textual forms.
//! With sampling enabled the exact curve is further reduced to a
//! [`SampledCurve`] lookup table.

pub mod emit;
pub mod expr;
pub mod sampled;

pub use emit::{Dialect, FUNCTION_NAME};
pub use expr::{Branch, CompiledCurve};
pub use sampled::SampledCurve;

use crate::curve::{SolverCache, remap};
use crate::error::CurveError;
use crate::model::path::{CurvePath, HandleSide, is_zero};
use crate::settings;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Knobs of a single compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Replace the exact curve with a lookup table
    pub use_sampling: bool,
    /// Also render the typed source
    pub emit_typed_source: bool,
    /// Samples per joint in sampled mode
    pub precision: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_sampling: false,
            emit_typed_source: true,
            precision: settings::compile::DEFAULT_PRECISION,
        }
    }
}

/// An exact compile: the executable curve and both textual forms
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub curve: CompiledCurve,
    pub typed_source: String,
    pub untyped_source: String,
}

/// Something that can be called with `t`
#[derive(Debug, Clone, PartialEq)]
pub enum CurveFunction {
    Exact(CompiledCurve),
    Sampled(SampledCurve),
}

impl CurveFunction {
    /// Evaluate at `t`
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            CurveFunction::Exact(curve) => curve.eval(t),
            CurveFunction::Sampled(sampled) => sampled.lookup(t),
        }
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self, CurveFunction::Sampled(_))
    }
}

/// Everything a caller gets back from [`compile_path_to_function`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledResult {
    pub function: CurveFunction,
    pub typed_source: Option<String>,
    pub untyped_source: String,
    pub sampled: bool,
    pub precision: usize,
    /// Set by the editor when a later compile failed and this result is stale
    pub has_error: bool,
    pub compile_duration: Duration,
}

impl CompiledResult {
    /// Evaluate the compiled function at `t`
    pub fn eval(&self, t: f64) -> f64 {
        self.function.eval(t)
    }

    pub fn compile_duration_ms(&self) -> f64 {
        self.compile_duration.as_secs_f64() * 1000.0
    }
}

/// Compiles paths, reusing Bezier solvers between compiles
#[derive(Debug, Clone, Default)]
pub struct FunctionCompiler {
    solvers: SolverCache,
}

impl FunctionCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solvers kept from the last compile
    pub fn solver_cache(&self) -> &SolverCache {
        &self.solvers
    }

    /// Build and validate the executable curve of `path`
    ///
    /// The path is normalized to [0, 1] first, so the result always maps
    /// the unit domain.
    pub fn build_curve(&mut self, path: &CurvePath) -> Result<CompiledCurve, CurveError> {
        let path = path.normalized();
        let branches = self.build_branches(&path);
        // Solvers of joints that no longer exist go away even when this
        // compile failed; the previous result still holds its own Arcs.
        self.solvers.sweep();

        let curve = CompiledCurve::new(branches?);
        validate(&curve)?;
        Ok(curve)
    }

    fn build_branches(&mut self, path: &CurvePath) -> Result<Vec<Branch>, CurveError> {
        if path.len() < 2 {
            return Err(CurveError::validation(
                0.0,
                format!("a curve needs at least two anchors, found {}", path.len()),
            ));
        }

        let mut branches = Vec::with_capacity(path.len() - 1);
        for (index, (left, right)) in path.joints().enumerate() {
            let (p0, p1) = (left.point, right.point);
            if p1.x <= p0.x || p0.x.is_nan() || p1.x.is_nan() {
                return Err(CurveError::validation(
                    p0.x,
                    format!("joint {index} spans x {} to {}", p0.x, p1.x),
                ));
            }

            if is_zero(left.handle_out) && is_zero(right.handle_in) {
                branches.push(Branch::linear(p0, p1));
                continue;
            }

            let c1 = left.handle_point(HandleSide::Out);
            let c2 = right.handle_point(HandleSide::In);
            let x1 = remap(c1.x, p0.x, p1.x, 0.0, 1.0);
            let y1 = remap(c1.y, p0.y, p1.y, 0.0, 1.0);
            let x2 = remap(c2.x, p0.x, p1.x, 0.0, 1.0);
            let y2 = remap(c2.y, p0.y, p1.y, 0.0, 1.0);
            let solver = self.solvers.get_or_build(x1, y1, x2, y2)?;
            branches.push(Branch::cubic(p0, p1, solver));
        }
        Ok(branches)
    }

    /// Compile `path` into its executable and textual forms
    pub fn compile(&mut self, path: &CurvePath) -> Result<CompiledFunction, CurveError> {
        let curve = self.build_curve(path)?;
        Ok(CompiledFunction {
            typed_source: emit::render_curve(&curve, Dialect::Typed),
            untyped_source: emit::render_curve(&curve, Dialect::Untyped),
            curve,
        })
    }

    /// Compile `path` as configured by `options`
    pub fn compile_with_options(
        &mut self,
        path: &CurvePath,
        options: &CompileOptions,
    ) -> Result<CompiledResult, CurveError> {
        let started = Instant::now();
        let curve = self.build_curve(path)?;
        let joints = curve.branches().len();
        let cubic = curve.branches().iter().filter(|b| b.is_cubic()).count();

        let (function, typed_source, untyped_source) = if options.use_sampling {
            let sampled =
                SampledCurve::compress(|t| curve.eval(t), &curve.x_ranges(), options.precision);
            if let Some(t) = sampled.non_finite_at() {
                return Err(CurveError::validation(t, "sampled value is not finite"));
            }
            let typed = options
                .emit_typed_source
                .then(|| sampled.source(Dialect::Typed));
            let untyped = sampled.source(Dialect::Untyped);
            (CurveFunction::Sampled(sampled), typed, untyped)
        } else {
            let typed = options
                .emit_typed_source
                .then(|| emit::render_curve(&curve, Dialect::Typed));
            let untyped = emit::render_curve(&curve, Dialect::Untyped);
            (CurveFunction::Exact(curve), typed, untyped)
        };

        let result = CompiledResult {
            sampled: function.is_sampled(),
            function,
            typed_source,
            untyped_source,
            precision: options.precision.max(2),
            has_error: false,
            compile_duration: started.elapsed(),
        };
        tracing::info!(
            "[FunctionCompiler::compile_with_options] {} joints ({} cubic), sampled: {}, {:.3} ms",
            joints,
            cubic,
            result.sampled,
            result.compile_duration_ms()
        );
        Ok(result)
    }
}

/// Check coefficients and probe the curve for non-finite output
fn validate(curve: &CompiledCurve) -> Result<(), CurveError> {
    if let Some(branch) = curve.branches().iter().find(|b| !b.is_finite()) {
        return Err(CurveError::validation(
            branch.start_x(),
            "joint has non-finite coefficients",
        ));
    }

    let steps = settings::compile::VALIDATION_STEPS;
    let probes = [0.0, 1.0]
        .into_iter()
        .chain((0..=steps).map(|i| i as f64 / steps as f64));
    for t in probes {
        let value = curve.eval(t);
        if !value.is_finite() {
            return Err(CurveError::validation(t, format!("evaluated to {value}")));
        }
    }
    Ok(())
}

/// One-shot compile with a fresh solver cache
pub fn compile_path_to_function(
    path: &CurvePath,
    options: &CompileOptions,
) -> Result<CompiledResult, CurveError> {
    FunctionCompiler::new().compile_with_options(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;
    use kurbo::{Point, Vec2};

    fn sweep() -> impl Iterator<Item = f64> {
        (0..=100).map(|i| i as f64 / 100.0)
    }

    /// Two anchors at (0, 0) and (1, 1) shaped like a CSS timing function
    fn eased_path(x1: f64, y1: f64, x2: f64, y2: f64) -> CurvePath {
        CurvePath::from_segments(
            vec![
                Segment::with_handles(Point::ZERO, Vec2::ZERO, Vec2::new(x1, y1)),
                Segment::with_handles(
                    Point::new(1.0, 1.0),
                    Vec2::new(x2 - 1.0, y2 - 1.0),
                    Vec2::ZERO,
                ),
            ],
            1.0,
        )
    }

    #[test]
    fn diagonal_compiles_to_identity() {
        let compiled = FunctionCompiler::new().compile(&CurvePath::default()).unwrap();
        for t in sweep() {
            assert!((compiled.curve.eval(t) - t).abs() < 1e-12);
        }
        assert!(!compiled.untyped_source.contains("function b("));
        assert!(compiled.typed_source.starts_with("function interpolate(t: number)"));
    }

    #[test]
    fn symmetric_cubic_passes_through_the_middle() {
        let compiled = FunctionCompiler::new()
            .compile(&eased_path(0.42, 0.0, 0.58, 1.0))
            .unwrap();
        assert!((compiled.curve.eval(0.5) - 0.5).abs() < 1e-3);
        assert_eq!(compiled.curve.eval(0.0), 0.0);
        assert_eq!(compiled.curve.eval(1.0), 1.0);
        assert_eq!(compiled.untyped_source.matches("function b(").count(), 1);
    }

    #[test]
    fn css_ease_matches_reference() {
        let compiled = FunctionCompiler::new()
            .compile(&eased_path(0.25, 0.1, 0.25, 1.0))
            .unwrap();
        assert!((compiled.curve.eval(0.5) - 0.8024).abs() < 1e-3);
    }

    #[test]
    fn larger_domains_are_normalized() {
        let path = CurvePath::new(4.0);
        let compiled = FunctionCompiler::new().compile(&path).unwrap();
        assert!((compiled.curve.eval(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(compiled.curve.x_ranges(), vec![(0.0, 1.0)]);
    }

    #[test]
    fn zero_width_joint_fails_validation() {
        let path = CurvePath::from_segments(
            vec![
                Segment::new(Point::new(0.0, 0.0)),
                Segment::new(Point::new(0.5, 0.2)),
                Segment::new(Point::new(0.5, 0.8)),
                Segment::new(Point::new(1.0, 1.0)),
            ],
            1.0,
        );
        let err = FunctionCompiler::new().compile(&path).unwrap_err();
        assert!(matches!(err, CurveError::CompileValidation { .. }), "{err}");
    }

    #[test]
    fn single_anchor_fails_validation() {
        let path = CurvePath::from_segments(vec![Segment::new(Point::ZERO)], 1.0);
        let err = FunctionCompiler::new().compile(&path).unwrap_err();
        assert!(matches!(err, CurveError::CompileValidation { .. }));
    }

    #[test]
    fn handle_past_the_joint_is_rejected() {
        let err = FunctionCompiler::new()
            .compile(&eased_path(1.5, 0.0, 0.5, 1.0))
            .unwrap_err();
        assert!(matches!(err, CurveError::InvalidControlPoints { .. }));
    }

    #[test]
    fn overshooting_y_handles_extrapolate() {
        let compiled = FunctionCompiler::new()
            .compile(&eased_path(0.3, 4.0, 0.7, -3.0))
            .unwrap();
        let values: Vec<f64> = sweep().map(|t| compiled.curve.eval(t)).collect();
        assert!(values.iter().any(|&v| v > 1.0));
        assert!(values.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn solvers_are_reused_and_swept() {
        let mut compiler = FunctionCompiler::new();
        let eased = eased_path(0.42, 0.0, 0.58, 1.0);
        let first = compiler.compile(&eased).unwrap();
        let second = compiler.compile(&eased).unwrap();
        assert_eq!(compiler.solver_cache().len(), 1);
        match (&first.curve.branches()[0], &second.curve.branches()[0]) {
            (Branch::Cubic { solver: a, .. }, Branch::Cubic { solver: b, .. }) => {
                assert!(std::sync::Arc::ptr_eq(a, b));
            }
            other => panic!("expected cubic joints, got {other:?}"),
        }

        compiler.compile(&CurvePath::default()).unwrap();
        assert!(compiler.solver_cache().is_empty());
    }

    #[test]
    fn sampled_mode_tracks_exact_curve() {
        let path = eased_path(0.42, 0.0, 0.58, 1.0);
        let options = CompileOptions {
            use_sampling: true,
            emit_typed_source: false,
            precision: 100,
        };
        let sampled = compile_path_to_function(&path, &options).unwrap();
        let exact = compile_path_to_function(&path, &CompileOptions::default()).unwrap();

        assert!(sampled.sampled);
        assert!(sampled.function.is_sampled());
        assert!(sampled.typed_source.is_none());
        assert!(sampled.untyped_source.contains("const samples = ["));
        assert!(!exact.sampled);
        assert!(exact.typed_source.is_some());
        for t in sweep() {
            assert!((sampled.eval(t) - exact.eval(t)).abs() < 0.01, "t = {t}");
        }
    }

    #[test]
    fn default_options() {
        let options = CompileOptions::default();
        assert!(!options.use_sampling);
        assert!(options.emit_typed_source);
        assert_eq!(options.precision, 100);
    }
}
