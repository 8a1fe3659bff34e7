// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Render compiled curves as source text.
//!
//! The same expression tree is rendered twice: once with type annotations
//! (`Dialect::Typed`) and once without (`Dialect::Untyped`). Both renderings
//! contain identical formulas. The unit Bezier solver is emitted once, and
//! only when the curve has at least one cubic joint; each cubic joint then
//! gets its own pre-built solver constant so the generated function does not
//! rebuild lookup tables on every call.
//!
//! Formatting is kept simple and line based; pretty-printing is left to
//! whoever displays the text.

use super::expr::{Branch, CompiledCurve};
use crate::curve::bezier::{
    NEWTON_ITERATIONS, NEWTON_MIN_SLOPE, SUBDIVISION_MAX_ITERATIONS, SUBDIVISION_PRECISION,
    TABLE_SIZE,
};
use std::fmt::Write;

/// Name of the generated function
pub const FUNCTION_NAME: &str = "interpolate";

/// Which textual form to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Parameters and return values annotated with `number`
    Typed,
    /// Bare parameters
    Untyped,
}

impl Dialect {
    /// Annotate a declaration with `ty`, or drop the annotation
    pub fn annotate(self, ty: &str) -> String {
        match self {
            Dialect::Typed => format!(": {ty}"),
            Dialect::Untyped => String::new(),
        }
    }
}

/// Placeholder for a `number` annotation in the solver template
const NUM: &str = "@NUM@";

/// Placeholder for the lookup table's array annotation
const NUM_ARRAY: &str = "@NUM_ARRAY@";

/// Placeholder for the solver's returned function type
const CURVE_FN: &str = "@CURVE_FN@";

const SOLVER_TEMPLATE: &str = "\
const TABLE_SIZE = @TABLE_SIZE@;
const TABLE_STEP = 1 / (TABLE_SIZE - 1);
const map = (v@NUM@, inMin@NUM@, inMax@NUM@, outMin@NUM@, outMax@NUM@)@NUM@ =>
  ((v - inMin) * (outMax - outMin)) / (inMax - inMin) + outMin;
const coeffA = (a1@NUM@, a2@NUM@)@NUM@ => 1 - 3 * a2 + 3 * a1;
const coeffB = (a1@NUM@, a2@NUM@)@NUM@ => 3 * a2 - 6 * a1;
const coeffC = (a1@NUM@)@NUM@ => 3 * a1;
const bezierAt = (t@NUM@, a1@NUM@, a2@NUM@)@NUM@ =>
  ((coeffA(a1, a2) * t + coeffB(a1, a2)) * t + coeffC(a1)) * t;
const slopeAt = (t@NUM@, a1@NUM@, a2@NUM@)@NUM@ =>
  3 * coeffA(a1, a2) * t * t + 2 * coeffB(a1, a2) * t + coeffC(a1);
function b(x1@NUM@, y1@NUM@, x2@NUM@, y2@NUM@)@CURVE_FN@ {
  if (x1 === y1 && x2 === y2) return (x@NUM@)@NUM@ => x;
  const table@NUM_ARRAY@ = [];
  for (let i = 0; i < TABLE_SIZE; ++i) table.push(bezierAt(i * TABLE_STEP, x1, x2));
  const tForX = (x@NUM@)@NUM@ => {
    let current = 1;
    while (current !== TABLE_SIZE - 1 && table[current] <= x) ++current;
    --current;
    const start = current * TABLE_STEP;
    const span = table[current + 1] - table[current];
    const guess = start + (span !== 0 ? (x - table[current]) / span : 0) * TABLE_STEP;
    const initialSlope = slopeAt(guess, x1, x2);
    if (initialSlope >= @NEWTON_MIN_SLOPE@) {
      let t = guess;
      for (let i = 0; i < @NEWTON_ITERATIONS@; ++i) {
        const slope = slopeAt(t, x1, x2);
        if (slope === 0) return t;
        t -= (bezierAt(t, x1, x2) - x) / slope;
      }
      return t;
    }
    if (initialSlope === 0) return guess;
    let lo = start;
    let hi = start + TABLE_STEP;
    let t = lo;
    let i = 0;
    do {
      t = lo + (hi - lo) / 2;
      const error = bezierAt(t, x1, x2) - x;
      if (error > 0) hi = t;
      else lo = t;
      if (Math.abs(error) <= @SUBDIVISION_PRECISION@) break;
    } while (++i < @SUBDIVISION_MAX_ITERATIONS@);
    return t;
  };
  return (x@NUM@)@NUM@ => (x === 0 || x === 1 ? x : bezierAt(tForX(x), y1, y2));
}
";

/// Source text of the unit Bezier solver
pub fn solver_source(dialect: Dialect) -> String {
    SOLVER_TEMPLATE
        .replace(NUM_ARRAY, &dialect.annotate("number[]"))
        .replace(NUM, &dialect.annotate("number"))
        .replace(CURVE_FN, &dialect.annotate("(x: number) => number"))
        .replace("@TABLE_SIZE@", &TABLE_SIZE.to_string())
        .replace("@NEWTON_MIN_SLOPE@", &NEWTON_MIN_SLOPE.to_string())
        .replace("@NEWTON_ITERATIONS@", &NEWTON_ITERATIONS.to_string())
        .replace("@SUBDIVISION_PRECISION@", &SUBDIVISION_PRECISION.to_string())
        .replace(
            "@SUBDIVISION_MAX_ITERATIONS@",
            &SUBDIVISION_MAX_ITERATIONS.to_string(),
        )
}

/// Wrap a function body in the `interpolate(t)` signature
pub fn wrap_function(body: &str, dialect: Dialect) -> String {
    let mut out = format!(
        "function {FUNCTION_NAME}(t{}){} {{\n",
        dialect.annotate("number"),
        dialect.annotate("number")
    );
    for line in body.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "  {line}");
        }
    }
    out.push_str("}\n");
    out
}

/// Render the whole compiled curve as a function
pub fn render_curve(curve: &CompiledCurve, dialect: Dialect) -> String {
    wrap_function(&render_body(curve, dialect), dialect)
}

/// Render the function body: solver (if needed), solver constants, branches
pub fn render_body(curve: &CompiledCurve, dialect: Dialect) -> String {
    let mut body = String::new();

    if curve.has_cubic() {
        body.push_str(&solver_source(dialect));
        body.push('\n');
        for (index, branch) in curve.branches().iter().enumerate() {
            if let Branch::Cubic { solver, .. } = branch {
                let (x1, y1, x2, y2) = solver.control_points();
                let _ = writeln!(
                    body,
                    "const {} = b({x1}, {y1}, {x2}, {y2});",
                    solver_name(index)
                );
            }
        }
    }

    let last_index = curve.branches().len().saturating_sub(1);
    for (index, branch) in curve.branches().iter().enumerate() {
        let expr = branch_expression(index, branch);
        if index == last_index {
            let _ = writeln!(body, "return {expr};");
        } else {
            let _ = writeln!(body, "if (t < {}) return {expr};", branch.end_x());
        }
    }

    body
}

fn solver_name(index: usize) -> String {
    format!("curve{index}")
}

/// The value expression of one branch
fn branch_expression(index: usize, branch: &Branch) -> String {
    match branch {
        Branch::Linear { x0, y0, x1, y1, .. } => {
            format!("(({y1} - {y0}) / ({x1} - {x0})) * (t - {x0}) + {y0}")
        }
        Branch::Cubic { x0, y0, x1, y1, .. } => format!(
            "map({}((t - {x0}) / ({x1} - {x0})), 0, 1, {y0}, {y1})",
            solver_name(index)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::UnitBezier;
    use kurbo::Point;
    use std::sync::Arc;

    fn linear_curve() -> CompiledCurve {
        CompiledCurve::new(vec![
            Branch::linear(Point::new(0.0, 0.0), Point::new(0.5, 0.25)),
            Branch::linear(Point::new(0.5, 0.25), Point::new(1.0, 1.0)),
        ])
    }

    fn mixed_curve() -> CompiledCurve {
        let solver = Arc::new(UnitBezier::new(0.42, 0.0, 0.58, 1.0).unwrap());
        CompiledCurve::new(vec![
            Branch::cubic(Point::new(0.0, 0.0), Point::new(0.5, 0.5), Arc::clone(&solver)),
            Branch::linear(Point::new(0.5, 0.5), Point::new(0.75, 0.5)),
            Branch::cubic(Point::new(0.75, 0.5), Point::new(1.0, 1.0), solver),
        ])
    }

    #[test]
    fn linear_curve_has_no_solver() {
        let source = render_curve(&linear_curve(), Dialect::Untyped);
        assert!(!source.contains("function b("));
        assert!(!source.contains("map("));
        assert_eq!(
            source,
            "function interpolate(t) {\n  \
             if (t < 0.5) return ((0.25 - 0) / (0.5 - 0)) * (t - 0) + 0;\n  \
             return ((1 - 0.25) / (1 - 0.5)) * (t - 0.5) + 0.25;\n}\n"
        );
    }

    #[test]
    fn solver_is_embedded_once() {
        let source = render_curve(&mixed_curve(), Dialect::Typed);
        assert_eq!(source.matches("function b(").count(), 1);
        assert!(source.contains("const curve0 = b(0.42, 0, 0.58, 1);"));
        assert!(source.contains("const curve2 = b(0.42, 0, 0.58, 1);"));
        let first = "if (t < 0.5) return map(curve0((t - 0) / (0.5 - 0)), 0, 1, 0, 0.5);";
        assert!(source.contains(first));
        assert!(source.contains("return map(curve2((t - 0.75) / (1 - 0.75)), 0, 1, 0.5, 1);"));
    }

    #[test]
    fn dialects_differ_only_in_annotations() {
        let typed = render_curve(&mixed_curve(), Dialect::Typed);
        let untyped = render_curve(&mixed_curve(), Dialect::Untyped);
        assert!(typed.starts_with("function interpolate(t: number): number {"));
        assert!(untyped.starts_with("function interpolate(t) {"));
        assert!(!untyped.contains(": number"));

        let stripped = typed
            .replace(": (x: number) => number", "")
            .replace(": number[]", "")
            .replace(": number", "");
        assert_eq!(stripped, untyped);
    }

    #[test]
    fn solver_source_uses_solver_constants() {
        let source = solver_source(Dialect::Untyped);
        assert!(source.contains("const TABLE_SIZE = 11;"));
        assert!(source.contains("initialSlope >= 0.001"));
        assert!(source.contains("i < 4"));
        assert!(source.contains("<= 0.0000001"));
        assert!(source.contains("while (++i < 10)"));
        assert!(!source.contains('@'));
    }
}
