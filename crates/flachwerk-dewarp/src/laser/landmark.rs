// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Landmark location — spine (interior peak of the laser curve) and outer page
// edge (outlier slope in a one-sided derivative of the curve).

use std::fmt;

use flachwerk_core::error::FlachwerkError;
use flachwerk_core::{DewarpConfig, FrameMode, PageSide};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::curve::{LaserCurve, LaserPair};

/// Half-width of the window a spine peak must dominate.
pub const SPINE_OFFSET_X: usize = 20;
/// Height by which a spine peak must clear its window boundary.
pub const SPINE_MARGIN: f64 = 5.0;
/// Half-width of the window an edge derivative peak must dominate.
pub const EDGE_OFFSET_X: usize = 3;
/// Column distance of the one-sided edge derivative.
pub const EDGE_DERIVATIVE_SPAN: usize = 16;
/// Sigma-clipping bound, in standard deviations, for both tails.
pub const EDGE_SIGMA: f64 = 3.0;

// -- Peak search --------------------------------------------------------------

/// Which extremum a peak search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakDirection {
    /// Candidate must be greater than or equal to its neighbourhood.
    Maximum,
    /// Candidate must be less than or equal to its neighbourhood.
    Minimum,
}

impl PeakDirection {
    fn holds(self, candidate: f64, other: f64) -> bool {
        match self {
            Self::Maximum => candidate >= other,
            Self::Minimum => candidate <= other,
        }
    }

    /// Whether `candidate` clears `other` by at least `margin`.
    fn clears(self, candidate: f64, other: f64, margin: f64) -> bool {
        match self {
            Self::Maximum => self.holds(candidate - margin, other),
            Self::Minimum => self.holds(candidate + margin, other),
        }
    }
}

/// Parameters of one peak search.
///
/// Walks from `start` towards `end` (exclusive) in whichever direction `end`
/// lies, so both left-to-right and right-to-left searches are expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSearch {
    pub start: isize,
    pub end: isize,
    /// Half-width of the neighbourhood the candidate must dominate.
    pub offset_x: isize,
    /// Minimum clearance over the neighbourhood boundary points.
    pub margin: f64,
    pub direction: PeakDirection,
}

impl PeakSearch {
    fn step(&self) -> isize {
        if self.end >= self.start { 1 } else { -1 }
    }

    /// Clamp a position into the searched interval.
    fn constrain(&self, pos: isize) -> isize {
        if self.start < self.end {
            pos.clamp(self.start, self.end - 1)
        } else {
            pos.clamp(self.end + 1, self.start)
        }
    }

    /// Clip the interval to valid indices of a sequence of length `len`.
    fn clipped_to(self, len: usize) -> Self {
        let len = len as isize;
        if self.step() > 0 {
            Self {
                start: self.start.max(0),
                end: self.end.min(len),
                ..self
            }
        } else {
            Self {
                start: self.start.min(len - 1),
                end: self.end.max(-1),
                ..self
            }
        }
    }
}

/// Every position from `candidate` up to (not including) `bound` is dominated
/// by the candidate.
fn dominates(points: &[f64], candidate: isize, bound: isize, direction: PeakDirection) -> bool {
    let step = if bound >= candidate { 1 } else { -1 };
    let value = points[candidate as usize];
    let mut i = candidate;
    while i != bound {
        if !direction.holds(value, points[i as usize]) {
            return false;
        }
        i += step;
    }
    true
}

/// Find all peaks in `points` along the search interval, in encounter order.
///
/// A position is a peak when it dominates every point within `offset_x` on
/// both sides and clears both window boundary points by `margin`.
pub fn find_peaks(points: &[f64], search: &PeakSearch) -> Vec<usize> {
    let search = search.clipped_to(points.len());
    let step = search.step();
    let mut peaks = Vec::new();

    let empty_range = if step > 0 {
        search.start >= search.end
    } else {
        search.start <= search.end
    };
    if points.is_empty() || empty_range {
        return peaks;
    }

    let mut i = search.start;
    while i != search.end {
        let left = search.constrain(i - search.offset_x);
        let right = search.constrain(i + search.offset_x);
        let value = points[i as usize];
        if dominates(points, i, left, search.direction)
            && dominates(points, i, right, search.direction)
            && search.direction.clears(value, points[left as usize], search.margin)
            && search.direction.clears(value, points[right as usize], search.margin)
        {
            peaks.push(i as usize);
        }
        i += step;
    }
    peaks
}

// -- Derivative and outlier rejection -----------------------------------------

/// One-sided finite difference of a curve.
///
/// Element `i` is `(curve[i + forward] - curve[i - back]) / (back + forward)`
/// with both indices clamped to the curve.
pub fn one_sided_derivative(curve: &[f64], back: usize, forward: usize) -> Vec<f64> {
    let span = (back + forward).max(1) as f64;
    let last = curve.len().saturating_sub(1);
    (0..curve.len())
        .map(|i| {
            let lo = i.saturating_sub(back);
            let hi = (i + forward).min(last);
            (curve[hi] - curve[lo]) / span
        })
        .collect()
}

/// Iteratively sigma-clip `values`, returning the final `(low, high)` bounds.
///
/// Each pass drops values outside `mean - low*std ..= mean + high*std`
/// (population standard deviation) until a pass removes nothing.
pub fn sigma_clip_bounds(values: &[f64], low: f64, high: f64) -> (f64, f64) {
    let mut kept: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    loop {
        if kept.is_empty() {
            return (f64::NEG_INFINITY, f64::INFINITY);
        }
        let n = kept.len() as f64;
        let mean = kept.iter().sum::<f64>() / n;
        let std = (kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        let lower = mean - std * low;
        let upper = mean + std * high;

        let before = kept.len();
        kept.retain(|&v| v >= lower && v <= upper);
        if kept.len() == before {
            return (lower, upper);
        }
    }
}

// -- Landmarks ----------------------------------------------------------------

/// The four landmarks of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    SpineTop,
    SpineBottom,
    EdgeTop,
    EdgeBottom,
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpineTop => write!(f, "top spine"),
            Self::SpineBottom => write!(f, "bottom spine"),
            Self::EdgeTop => write!(f, "top edge"),
            Self::EdgeBottom => write!(f, "bottom edge"),
        }
    }
}

/// Spine and edge columns on both laser curves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandmarkSet {
    pub spine_top: usize,
    pub spine_bottom: usize,
    pub edge_top: usize,
    pub edge_bottom: usize,
    /// Landmarks that were not detected and hold a default column instead.
    pub defaulted: Vec<Landmark>,
}

impl LandmarkSet {
    /// The top `(A, B)` and bottom `(D, C)` column ranges, each ordered so the
    /// first column is the left end of the page.
    pub fn segments(&self, side: PageSide) -> ((usize, usize), (usize, usize)) {
        match side {
            PageSide::Odd => (
                (self.spine_top, self.edge_top),
                (self.spine_bottom, self.edge_bottom),
            ),
            PageSide::Even => (
                (self.edge_top, self.spine_top),
                (self.edge_bottom, self.spine_bottom),
            ),
        }
    }
}

/// Column window `[start, end)` searched for the spine.
pub fn spine_window(width: usize, config: &DewarpConfig) -> (usize, usize) {
    let third = width / 3;
    match (config.frame, config.page_side) {
        (FrameMode::Double, _) => (third, 2 * third),
        (FrameMode::Single, PageSide::Odd) => (0, third),
        (FrameMode::Single, PageSide::Even) => (2 * third, width),
    }
}

/// Locate the spine on one curve: the median of all qualifying peaks.
pub fn find_spine(
    curve: &LaserCurve,
    window: (usize, usize),
    direction: PeakDirection,
    landmark: Landmark,
) -> Result<usize, FlachwerkError> {
    let search = PeakSearch {
        start: window.0 as isize,
        end: window.1 as isize,
        offset_x: SPINE_OFFSET_X as isize,
        margin: SPINE_MARGIN,
        direction,
    };
    let peaks = find_peaks(curve.heights(), &search);
    debug!(%landmark, ?peaks, "Spine candidates");

    match peaks.get(peaks.len() / 2) {
        Some(&spine) => Ok(spine),
        None => Err(FlachwerkError::LandmarkNotFound {
            landmark: landmark.to_string(),
            candidates: peaks,
        }),
    }
}

/// Where the edge search starts and stops, plus the derivative span on each side.
struct EdgeSearch {
    start: usize,
    end: usize,
    back: usize,
    forward: usize,
}

impl EdgeSearch {
    fn for_side(width: usize, side: PageSide) -> Self {
        let third = width / 3;
        match side {
            PageSide::Odd => Self {
                start: 2 * third,
                end: width.saturating_sub(1),
                back: 0,
                forward: EDGE_DERIVATIVE_SPAN,
            },
            PageSide::Even => Self {
                start: third,
                end: 1,
                back: EDGE_DERIVATIVE_SPAN,
                forward: 0,
            },
        }
    }
}

/// Locate the outer page edge on one curve.
///
/// Derivative peaks are candidates; the first one (walking outward from the
/// spine side) whose slope is an outlier after sigma clipping is the edge.
pub fn find_edge(
    curve: &LaserCurve,
    side: PageSide,
    direction: PeakDirection,
    landmark: Landmark,
) -> Result<usize, FlachwerkError> {
    let bounds = EdgeSearch::for_side(curve.len(), side);
    let derivative = one_sided_derivative(curve.heights(), bounds.back, bounds.forward);
    let search = PeakSearch {
        start: bounds.start as isize,
        end: bounds.end as isize,
        offset_x: EDGE_OFFSET_X as isize,
        margin: 0.0,
        direction,
    };
    let candidates = find_peaks(&derivative, &search);
    let (low, high) = sigma_clip_bounds(&derivative, EDGE_SIGMA, EDGE_SIGMA);
    debug!(%landmark, candidates = candidates.len(), low, high, "Edge candidates");

    candidates
        .iter()
        .copied()
        .find(|&c| derivative[c] < low || derivative[c] > high)
        .ok_or(FlachwerkError::LandmarkNotFound {
            landmark: landmark.to_string(),
            candidates,
        })
}

/// Fallback spine column: the window boundary on the side away from the page.
fn default_spine(window: (usize, usize), side: PageSide) -> usize {
    match side {
        PageSide::Odd => window.0,
        PageSide::Even => window.1.saturating_sub(1),
    }
}

/// Fallback edge column: where the edge search stops.
fn default_edge(width: usize, side: PageSide) -> usize {
    EdgeSearch::for_side(width, side).end
}

/// Find spine and edge on both laser curves.
///
/// A landmark that cannot be detected is logged, replaced by its default
/// column, and listed in [`LandmarkSet::defaulted`].
#[instrument(skip_all, fields(width = lasers.top.len(), side = %config.page_side, frame = %config.frame))]
pub fn locate_landmarks(lasers: &LaserPair, config: &DewarpConfig) -> LandmarkSet {
    let width = lasers.top.len();
    let side = config.page_side;
    let window = spine_window(width, config);
    let mut defaulted = Vec::new();

    let mut resolve = |found: Result<usize, FlachwerkError>, landmark: Landmark, fallback: usize| {
        found.unwrap_or_else(|err| {
            warn!(error = %err, fallback, "Using default landmark");
            defaulted.push(landmark);
            fallback
        })
    };

    let spine_top = resolve(
        find_spine(&lasers.top, window, PeakDirection::Maximum, Landmark::SpineTop),
        Landmark::SpineTop,
        default_spine(window, side),
    );
    let spine_bottom = resolve(
        find_spine(&lasers.bottom, window, PeakDirection::Minimum, Landmark::SpineBottom),
        Landmark::SpineBottom,
        default_spine(window, side),
    );
    let edge_top = resolve(
        find_edge(&lasers.top, side, PeakDirection::Maximum, Landmark::EdgeTop),
        Landmark::EdgeTop,
        default_edge(width, side),
    );
    let edge_bottom = resolve(
        find_edge(&lasers.bottom, side, PeakDirection::Minimum, Landmark::EdgeBottom),
        Landmark::EdgeBottom,
        default_edge(width, side),
    );

    info!(
        spine_top,
        spine_bottom,
        edge_top,
        edge_bottom,
        defaulted = defaulted.len(),
        "Landmarks located"
    );

    LandmarkSet {
        spine_top,
        spine_bottom,
        edge_top,
        edge_bottom,
        defaulted,
    }
}
