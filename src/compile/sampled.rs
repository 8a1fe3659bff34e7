// Copyright 2025 the Curvesmith Authors
// SPDX-License-Identifier: Apache-2.0

//! Lookup-table approximation of a compiled curve.
//!
//! Each joint's x range gets `precision` evenly spaced samples, both ends
//! included. Lookups binary-search the containing range and lerp between
//! the two nearest samples.

use super::emit::{Dialect, wrap_function};
use std::fmt::Write;

/// A curve reduced to per-range sample tables
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    ranges: Vec<(f64, f64)>,
    samples: Vec<Vec<f64>>,
}

impl SampledCurve {
    /// Sample `f` over each of `ranges`
    ///
    /// Precision below 2 is raised to 2 so every range keeps both ends.
    pub fn compress<F: Fn(f64) -> f64>(f: F, ranges: &[(f64, f64)], precision: usize) -> Self {
        let n = precision.max(2);
        let last = (n - 1) as f64;
        let samples = ranges
            .iter()
            .map(|&(start, end)| {
                (0..n)
                    .map(|i| {
                        // hit the end exactly instead of accumulating error
                        let x = if i == n - 1 {
                            end
                        } else {
                            start + (end - start) * i as f64 / last
                        };
                        f(x)
                    })
                    .collect()
            })
            .collect();
        tracing::debug!(
            "[SampledCurve::compress] {} ranges x {} samples",
            ranges.len(),
            n
        );
        Self {
            ranges: ranges.to_vec(),
            samples,
        }
    }

    /// Sampled x ranges
    pub fn ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    /// Sample table of each range
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// Samples per range
    pub fn precision(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// The x of the first sample that is not finite, if any
    pub fn non_finite_at(&self) -> Option<f64> {
        self.ranges
            .iter()
            .zip(&self.samples)
            .find_map(|(&(start, end), table)| {
                let last = table.len().saturating_sub(1).max(1) as f64;
                table
                    .iter()
                    .position(|v| !v.is_finite())
                    .map(|i| start + (end - start) * i as f64 / last)
            })
    }

    /// Approximate the curve at `x`
    pub fn lookup(&self, x: f64) -> f64 {
        let (Some(&(first_start, _)), Some(&(_, last_end))) =
            (self.ranges.first(), self.ranges.last())
        else {
            return f64::NAN;
        };
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= first_start {
            return self.samples[0].first().copied().unwrap_or(f64::NAN);
        }
        if x >= last_end {
            return self.samples[self.samples.len() - 1]
                .last()
                .copied()
                .unwrap_or(f64::NAN);
        }

        let index = self
            .ranges
            .partition_point(|&(_, end)| end < x)
            .min(self.ranges.len() - 1);
        let (start, end) = self.ranges[index];
        let table = &self.samples[index];
        let n = table.len();
        if n == 0 {
            return f64::NAN;
        }
        if x == start {
            return table[0];
        }
        if x == end || end == start {
            return table[n - 1];
        }

        let position = (x - start) / (end - start) * (n - 1) as f64;
        let floor = (position.floor() as usize).min(n - 1);
        let ceil = (floor + 1).min(n - 1);
        let fraction = position - floor as f64;
        table[floor] + (table[ceil] - table[floor]) * fraction
    }

    /// Render the lookup evaluator as source text
    pub fn source(&self, dialect: Dialect) -> String {
        let (ranges_ty, samples_ty) = match dialect {
            Dialect::Typed => (": [number, number][]", ": number[][]"),
            Dialect::Untyped => ("", ""),
        };
        let mut body = String::new();
        let ranges = self
            .ranges
            .iter()
            .map(|(a, b)| format!("[{a}, {b}]"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(body, "const ranges{ranges_ty} = [{ranges}];");
        let _ = writeln!(body, "const samples{samples_ty} = [");
        for table in &self.samples {
            let row = table
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(body, "  [{row}],");
        }
        body.push_str(LOOKUP_BODY);
        wrap_function(&body, dialect)
    }
}

const LOOKUP_BODY: &str = "\
];
if (Number.isNaN(t)) return NaN;
if (t <= ranges[0][0]) return samples[0][0];
const lastRange = ranges.length - 1;
if (t >= ranges[lastRange][1]) return samples[lastRange][samples[lastRange].length - 1];
let lo = 0;
let hi = lastRange;
while (lo < hi) {
  const mid = (lo + hi) >> 1;
  if (ranges[mid][1] < t) lo = mid + 1;
  else hi = mid;
}
const [start, end] = ranges[lo];
const table = samples[lo];
const n = table.length;
if (t === start) return table[0];
if (t === end) return table[n - 1];
const position = ((t - start) / (end - start)) * (n - 1);
const floor = Math.floor(position);
const ceil = Math.min(floor + 1, n - 1);
return table[floor] + (table[ceil] - table[floor]) * (position - floor);
";
