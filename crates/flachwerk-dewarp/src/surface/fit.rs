// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Curve fitting — binned least-squares polynomial models of a laser curve
// segment.

use flachwerk_core::error::{FlachwerkError, Result};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument, warn};

use crate::laser::curve::LaserCurve;

/// Columns averaged into one sample before fitting.
pub const BIN_WIDTH: usize = 50;
/// Degree of the fitted polynomial.
pub const FIT_DEGREE: usize = 7;

/// A polynomial in `x`, stored over a normalised variable.
///
/// Coefficients apply to `t = (x - center) / half_span`, which keeps the
/// high powers of pixel coordinates well conditioned. Evaluation is valid at
/// any `x`; outside the fitted range it extrapolates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    coefficients: Vec<f64>,
    center: f64,
    half_span: f64,
}

impl PolynomialModel {
    /// A polynomial with the given coefficients in plain `x` (lowest power first).
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self {
            coefficients,
            center: 0.0,
            half_span: 1.0,
        }
    }

    /// A model that evaluates to `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self::from_coefficients(vec![value])
    }

    /// Least-squares fit of a polynomial of at most `degree` to `(xs, ys)`.
    ///
    /// The degree is reduced to `xs.len() - 1` when there are too few samples.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(FlachwerkError::DegenerateGeometry(format!(
                "cannot fit {} x values to {} y values",
                xs.len(),
                ys.len()
            )));
        }

        let degree = degree.min(xs.len() - 1);
        let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let center = (min + max) / 2.0;
        let half_span = if max > min { (max - min) / 2.0 } else { 1.0 };

        let design = DMatrix::from_fn(xs.len(), degree + 1, |row, col| {
            ((xs[row] - center) / half_span).powi(col as i32)
        });
        let rhs = DVector::from_column_slice(ys);

        let coefficients = design
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|err| FlachwerkError::DegenerateGeometry(format!("polynomial fit: {err}")))?;

        Ok(Self {
            coefficients: coefficients.iter().copied().collect(),
            center,
            half_span,
        })
    }

    /// Coefficients over the normalised variable, lowest power first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate the polynomial at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.half_span;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    /// The polynomial multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
            ..self.clone()
        }
    }

    /// The derivative with respect to `x`.
    pub fn derivative(&self) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| c * power as f64 / self.half_span)
            .collect::<Vec<_>>();
        Self {
            coefficients: if coefficients.is_empty() {
                vec![0.0]
            } else {
                coefficients
            },
            center: self.center,
            half_span: self.half_span,
        }
    }
}

/// Fit a polynomial to the curve columns `[left, right)`.
///
/// The segment is split into bins of about [`BIN_WIDTH`] columns; each bin
/// contributes its mean height at its centre column. An empty or inverted
/// segment yields a constant model at the curve height of `left`.
#[instrument(skip(curve), fields(width = curve.len()))]
pub fn fit_segment(curve: &LaserCurve, left: usize, right: usize) -> Result<PolynomialModel> {
    let right = right.min(curve.len());
    if left >= right {
        let value = if curve.is_empty() {
            0.0
        } else {
            curve[left.min(curve.len() - 1)]
        };
        warn!(left, right, value, "Empty curve segment; using a constant model");
        return Ok(PolynomialModel::constant(value));
    }

    let span = right - left;
    let bins = (span / BIN_WIDTH).max(1);
    // Bin edges split the sampled range [0, span - 1] evenly.
    let range = (span - 1) as f64;
    let bin_width = range / bins as f64;

    let mut sums = vec![0.0; bins];
    let mut counts = vec![0usize; bins];
    for offset in 0..span {
        let bin = if range > 0.0 {
            ((offset as f64 / bin_width) as usize).min(bins - 1)
        } else {
            0
        };
        sums[bin] += curve[left + offset];
        counts[bin] += 1;
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..bins)
        .filter(|&bin| counts[bin] > 0)
        .map(|bin| {
            let center = left as f64 + (bin as f64 + 0.5) * bin_width;
            (center, sums[bin] / counts[bin] as f64)
        })
        .unzip();

    let model = PolynomialModel::fit(&xs, &ys, FIT_DEGREE)?;
    debug!(bins = xs.len(), degree = model.degree(), "Segment fitted");
    Ok(model)
}
