// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Expression tree of a compiled curve and its interpreter.
//!
//! A compiled curve is a chain of guarded branches, one per joint. Every
//! branch except the last applies while `t < branch.end_x()`; the last one
//! catches everything else. Evaluation is a linear scan, which is fine for
//! the handful of joints an interactively edited curve has.

use crate::curve::{UnitBezier, remap};
use kurbo::Point;
use std::sync::Arc;

/// One joint of a compiled curve
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    /// Straight line from (x0, y0) to (x1, y1)
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        slope: f64,
    },
    /// Cubic Bezier solved in the unit cell and mapped onto the joint
    Cubic {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        solver: Arc<UnitBezier>,
    },
}

impl Branch {
    /// A straight joint between two anchors
    pub fn linear(p0: Point, p1: Point) -> Self {
        Branch::Linear {
            x0: p0.x,
            y0: p0.y,
            x1: p1.x,
            y1: p1.y,
            slope: (p1.y - p0.y) / (p1.x - p0.x),
        }
    }

    /// A curved joint between two anchors
    ///
    /// `solver` works in the unit cell spanned by the two anchors.
    pub fn cubic(p0: Point, p1: Point, solver: Arc<UnitBezier>) -> Self {
        Branch::Cubic {
            x0: p0.x,
            y0: p0.y,
            x1: p1.x,
            y1: p1.y,
            solver,
        }
    }

    /// Left anchor x
    pub fn start_x(&self) -> f64 {
        match self {
            Branch::Linear { x0, .. } | Branch::Cubic { x0, .. } => *x0,
        }
    }

    /// Right anchor x; the guard of this branch
    pub fn end_x(&self) -> f64 {
        match self {
            Branch::Linear { x1, .. } | Branch::Cubic { x1, .. } => *x1,
        }
    }

    /// Whether this joint is curved
    pub fn is_cubic(&self) -> bool {
        matches!(self, Branch::Cubic { .. })
    }

    /// Whether every coefficient of the joint is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Branch::Linear {
                x0,
                y0,
                x1,
                y1,
                slope,
            } => [x0, y0, x1, y1, slope].iter().all(|v| v.is_finite()),
            Branch::Cubic { x0, y0, x1, y1, .. } => {
                [x0, y0, x1, y1].iter().all(|v| v.is_finite())
            }
        }
    }

    /// Evaluate the joint at `t`
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            Branch::Linear { x0, y0, slope, .. } => slope * (t - x0) + y0,
            Branch::Cubic {
                x0,
                y0,
                x1,
                y1,
                solver,
            } => {
                let u = (t - x0) / (x1 - x0);
                remap(solver.eval(u), 0.0, 1.0, *y0, *y1)
            }
        }
    }
}

/// The executable form of a curve
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCurve {
    branches: Vec<Branch>,
}

impl CompiledCurve {
    pub(crate) fn new(branches: Vec<Branch>) -> Self {
        Self { branches }
    }

    /// Branches in x order
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Whether any joint is curved
    pub fn has_cubic(&self) -> bool {
        self.branches.iter().any(Branch::is_cubic)
    }

    /// The x span of every branch, in order
    pub fn x_ranges(&self) -> Vec<(f64, f64)> {
        self.branches
            .iter()
            .map(|b| (b.start_x(), b.end_x()))
            .collect()
    }

    /// Evaluate the curve at `t`
    ///
    /// NaN yields NaN. Infinite inputs are clamped to the first and last
    /// anchor x; finite inputs outside the domain extrapolate the outer
    /// joints.
    pub fn eval(&self, t: f64) -> f64 {
        let (Some(first), Some(last)) = (self.branches.first(), self.branches.last()) else {
            return f64::NAN;
        };
        if t.is_nan() {
            return f64::NAN;
        }
        let t = if t.is_infinite() {
            t.clamp(first.start_x(), last.end_x())
        } else {
            t
        };

        let last_index = self.branches.len() - 1;
        for (index, branch) in self.branches.iter().enumerate() {
            if index == last_index || t < branch.end_x() {
                return branch.eval(t);
            }
        }
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_solver() -> Arc<UnitBezier> {
        Arc::new(UnitBezier::new(0.25, 0.25, 0.75, 0.75).unwrap())
    }

    #[test]
    fn linear_branch_interpolates() {
        let branch = Branch::linear(Point::new(0.2, 0.4), Point::new(0.6, 0.0));
        assert!((branch.eval(0.2) - 0.4).abs() < 1e-12);
        assert!((branch.eval(0.4) - 0.2).abs() < 1e-12);
        assert!(branch.eval(0.6).abs() < 1e-12);
    }

    #[test]
    fn cubic_branch_maps_onto_joint() {
        let branch = Branch::cubic(Point::new(0.5, 1.0), Point::new(1.0, 3.0), identity_solver());
        assert_eq!(branch.eval(0.5), 1.0);
        assert_eq!(branch.eval(1.0), 3.0);
        assert!((branch.eval(0.75) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn guards_pick_the_containing_joint() {
        let curve = CompiledCurve::new(vec![
            Branch::linear(Point::new(0.0, 0.0), Point::new(0.5, 1.0)),
            Branch::linear(Point::new(0.5, 1.0), Point::new(1.0, 0.0)),
        ]);
        assert_eq!(curve.eval(0.0), 0.0);
        assert_eq!(curve.eval(0.25), 0.5);
        assert_eq!(curve.eval(0.5), 1.0);
        assert_eq!(curve.eval(0.75), 0.5);
        assert_eq!(curve.eval(1.0), 0.0);
        // extrapolation beyond the last anchor
        assert_eq!(curve.eval(1.5), -1.0);
    }

    #[test]
    fn non_finite_inputs() {
        let curve = CompiledCurve::new(vec![Branch::linear(
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
        )]);
        assert!(curve.eval(f64::NAN).is_nan());
        assert_eq!(curve.eval(f64::INFINITY), 2.0);
        assert_eq!(curve.eval(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn empty_curve_evaluates_to_nan() {
        let curve = CompiledCurve::new(Vec::new());
        assert!(curve.eval(0.5).is_nan());
        assert!(!curve.has_cubic());
    }
}
