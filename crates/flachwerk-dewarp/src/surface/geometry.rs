// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small 2-D geometry helpers.

/// Euclidean distance between two points.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// A non-vertical line in slope-intercept form, through two points.
///
/// The two points must have distinct x-coordinates; a vertical line has no
/// finite slope and `y`/`x` then return non-finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    slope: f64,
    point: (f64, f64),
}

impl Line {
    pub fn through(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            slope: (b.1 - a.1) / (b.0 - a.0),
            point: a,
        }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn y(&self, x: f64) -> f64 {
        (x - self.point.0) * self.slope + self.point.1
    }

    pub fn x(&self, y: f64) -> f64 {
        (y - self.point.1) / self.slope + self.point.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert!((distance((1.0, 2.0), (4.0, 6.0)) - 5.0).abs() < 1e-12);
        assert_eq!(distance((3.0, 3.0), (3.0, 3.0)), 0.0);
    }

    #[test]
    fn line_evaluates_both_ways() {
        let line = Line::through((0.0, 1.0), (4.0, 9.0));
        assert_eq!(line.slope(), 2.0);
        assert_eq!(line.y(2.5), 6.0);
        assert_eq!(line.x(6.0), 2.5);
    }

    #[test]
    fn vertical_line_is_not_finite() {
        let line = Line::through((2.0, 0.0), (2.0, 5.0));
        assert!(!line.slope().is_finite());
    }
}
