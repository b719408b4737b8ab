// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Arc-length integration along a fitted laser curve.

use std::ops::Index;

use tracing::{debug, instrument};

use super::fit::PolynomialModel;

/// Maximum number of Romberg halvings.
pub const ROMBERG_MAX_DEPTH: usize = 20;
/// Absolute and relative convergence tolerance for Romberg integration.
pub const ROMBERG_TOLERANCE: f64 = 1.48e-8;

/// Integrate `f` over `[a, b]` with Romberg's method.
///
/// Trapezoid estimates with successively halved steps are combined by
/// Richardson extrapolation until two successive diagonal entries agree within
/// [`ROMBERG_TOLERANCE`] or `max_depth` halvings have been made.
pub fn romberg<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, max_depth: usize) -> f64 {
    if a == b {
        return 0.0;
    }

    let interval = b - a;
    let mut previous = vec![0.5 * interval * (f(a) + f(b))];
    let mut estimate = previous[0];

    for depth in 1..=max_depth {
        let segments = 1usize << (depth - 1);
        let step = interval / segments as f64;
        let midpoints: f64 = (0..segments)
            .map(|k| f(a + (k as f64 + 0.5) * step))
            .sum();

        let mut row = Vec::with_capacity(depth + 1);
        row.push(0.5 * (previous[0] + step * midpoints));
        for m in 1..=depth {
            let factor = 4f64.powi(m as i32);
            row.push(row[m - 1] + (row[m - 1] - previous[m - 1]) / (factor - 1.0));
        }

        let refined = row[depth];
        let error = (refined - estimate).abs();
        estimate = refined;
        if error < ROMBERG_TOLERANCE || error < ROMBERG_TOLERANCE * refined.abs() {
            break;
        }
        previous = row;
    }
    estimate
}

/// Cumulative arc length of a curve, one value per image column.
///
/// Zero up to the left end of the fitted segment, non-decreasing across it,
/// and flat after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    values: Vec<f64>,
}

impl ArcLengthTable {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arc length at column `x`; past the table end the last value holds.
    pub fn at(&self, x: usize) -> f64 {
        match self.values.get(x) {
            Some(&v) => v,
            None => self.values.last().copied().unwrap_or(0.0),
        }
    }
}

impl Index<usize> for ArcLengthTable {
    type Output = f64;

    fn index(&self, x: usize) -> &f64 {
        &self.values[x]
    }
}

/// Integrate the arc length of `model` from `left` to every column of `[left, right)`.
///
/// The curve is first scaled by `height_factor`, so the integrand is
/// `sqrt(1 + (h * f'(x))^2)`. Each unit column step is integrated with
/// [`romberg`] and accumulated. Columns before `left` are 0; columns from
/// `right` onward hold the value reached at `right - 1`.
#[instrument(skip(model), fields(degree = model.degree()))]
pub fn integrate_arc_length(
    model: &PolynomialModel,
    left: usize,
    right: usize,
    height_factor: f64,
    width: usize,
) -> ArcLengthTable {
    let slope = model.scaled(height_factor).derivative();
    let integrand = |x: f64| {
        let s = slope.eval(x);
        (1.0 + s * s).sqrt()
    };

    let right = right.min(width);
    let mut values = vec![0.0; width];
    let mut total = 0.0;
    for x in left.saturating_add(1)..right {
        total += romberg(&integrand, (x - 1) as f64, x as f64, ROMBERG_MAX_DEPTH);
        values[x] = total;
    }
    if right > left {
        for value in &mut values[right..] {
            *value = total;
        }
    }

    debug!(total, "Arc length integrated");
    ArcLengthTable { values }
}
