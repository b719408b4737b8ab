// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate map construction — unrolls the page between two boundary curves.
//
// Each destination column corresponds to an arc-length position along the
// top curve (AB) and the same arc-length fraction along the bottom curve
// (DC). The straight segment E→G between those two points is the ruling of
// the page surface at that column; destination rows are spaced evenly along it.

use tracing::{debug, instrument, warn};

use crate::surface::arc::ArcLengthTable;
use crate::surface::fit::PolynomialModel;
use crate::surface::geometry::{Line, distance};

/// Slack allowed when rounding the unrolled size, so fitting noise on an
/// integral size does not add or drop a whole column or row.
const SIZE_EPSILON: f64 = 1e-6;

/// Source coordinates for every destination pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMap {
    width: u32,
    height: u32,
    source_x: Vec<f32>,
    source_y: Vec<f32>,
}

impl CoordinateMap {
    /// A map of the given size with every entry at the source origin.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            source_x: vec![0.0; len],
            source_y: vec![0.0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Source `(x, y)` sampled for destination pixel `(x, y)`.
    ///
    /// Panics if the destination pixel is outside the map.
    pub fn get(&self, x: u32, y: u32) -> (f32, f32) {
        let i = self.offset(x, y);
        (self.source_x[i], self.source_y[i])
    }

    pub fn set(&mut self, x: u32, y: u32, source: (f32, f32)) {
        let i = self.offset(x, y);
        self.source_x[i] = source.0;
        self.source_y[i] = source.1;
    }
}

/// One page boundary: its fitted curve, arc-length table and column range.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryCurve<'a> {
    pub model: &'a PolynomialModel,
    pub arc: &'a ArcLengthTable,
    /// Left column of the page segment (A or D).
    pub near: usize,
    /// Right column of the page segment (B or C).
    pub far: usize,
}

impl BoundaryCurve<'_> {
    fn point(&self, x: usize) -> (f64, f64) {
        (x as f64, self.model.eval(x as f64))
    }

    /// Total arc length at the far landmark.
    pub fn total_arc(&self) -> f64 {
        self.arc.at(self.far)
    }

    /// Straight chord between the two landmarks, or `None` when they share
    /// a column.
    pub fn chord(&self) -> Option<Line> {
        (self.near != self.far).then(|| Line::through(self.point(self.near), self.point(self.far)))
    }
}

/// Unrolled page size `(width, height)` before rounding.
///
/// The width is the longer total arc length of the two curves; the height is
/// the shorter of the two corner-to-corner distances A–D and B–C.
pub fn unrolled_size(top: &BoundaryCurve<'_>, bottom: &BoundaryCurve<'_>) -> (f64, f64) {
    let width = top.total_arc().max(bottom.total_arc());
    let height = distance(top.point(top.near), bottom.point(bottom.near))
        .min(distance(top.point(top.far), bottom.point(bottom.far)));
    (width, height)
}

/// Build the dense coordinate map unrolling the page between `top` (AB) and
/// `bottom` (DC).
///
/// The map is `ceil(width)` by `floor(height)` of [`unrolled_size`]. Column
/// pointers along each curve only ever advance, and never past the far
/// landmark, so the whole walk is linear in the page width.
#[instrument(skip_all, fields(a = top.near, b = top.far, d = bottom.near, c = bottom.far))]
pub fn build_coordinate_map(top: &BoundaryCurve<'_>, bottom: &BoundaryCurve<'_>) -> CoordinateMap {
    let (width, height) = unrolled_size(top, bottom);
    let out_width = (width - SIZE_EPSILON).ceil().max(0.0) as u32;
    let out_height = (height + SIZE_EPSILON).floor().max(0.0) as u32;
    let mut map = CoordinateMap::new(out_width, out_height);

    if map.is_empty() {
        warn!(width, height, "Page unrolls to an empty map");
        return map;
    }

    let top_total = top.total_arc();
    let bottom_total = bottom.total_arc();
    let mut top_x = top.near;
    let mut bottom_x = bottom.near;
    let mut collapsed = 0u32;

    for dest_x in 0..out_width {
        let target_arc = dest_x as f64 * top_total / width;
        while top_x < top.far && top.arc.at(top_x) < target_arc {
            top_x += 1;
        }

        let fraction = if top_total > 0.0 {
            target_arc / top_total
        } else {
            dest_x as f64 / width
        };
        if bottom_total > 0.0 {
            while bottom_x < bottom.far && bottom.arc.at(bottom_x) / bottom_total < fraction {
                bottom_x += 1;
            }
        }

        let e = top.point(top_x);
        let g = bottom.point(bottom_x);
        let angle = (g.1 - e.1).atan2(g.0 - e.0);
        let (sin, cos) = angle.sin_cos();
        let spacing = distance(e, g) / height;
        if spacing == 0.0 {
            collapsed += 1;
        }

        for dest_y in 0..out_height {
            let along = dest_y as f64 * spacing;
            map.set(
                dest_x,
                dest_y,
                ((e.0 + along * cos) as f32, (e.1 + along * sin) as f32),
            );
        }
    }

    if collapsed > 0 {
        warn!(collapsed, "Columns with coincident boundary points repeat a single source pixel");
    }
    debug!(out_width, out_height, "Coordinate map built");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::arc::integrate_arc_length;

    fn flat_page(
        top_y: f64,
        bottom_y: f64,
        left: usize,
        right: usize,
        width: usize,
    ) -> (PolynomialModel, PolynomialModel, ArcLengthTable, ArcLengthTable) {
        let top = PolynomialModel::constant(top_y);
        let bottom = PolynomialModel::constant(bottom_y);
        let top_arc = integrate_arc_length(&top, left, right, 1.0, width);
        let bottom_arc = integrate_arc_length(&bottom, left, right, 1.0, width);
        (top, bottom, top_arc, bottom_arc)
    }

    #[test]
    fn flat_page_maps_to_axis_aligned_identity() {
        let (top, bottom, top_arc, bottom_arc) = flat_page(20.0, 80.0, 10, 110, 120);
        let ab = BoundaryCurve { model: &top, arc: &top_arc, near: 10, far: 110 };
        let dc = BoundaryCurve { model: &bottom, arc: &bottom_arc, near: 10, far: 110 };

        let map = build_coordinate_map(&ab, &dc);
        // Arc length at B holds the value reached at B - 1.
        assert_eq!((map.width(), map.height()), (99, 60));

        for (x, y) in [(0, 0), (5, 17), (50, 30), (98, 59)] {
            let (sx, sy) = map.get(x, y);
            assert!((sx - (10 + x) as f32).abs() < 1e-3, "x at ({x}, {y}) = {sx}");
            assert!((sy - (20 + y) as f32).abs() < 1e-3, "y at ({x}, {y}) = {sy}");
        }
    }

    #[test]
    fn size_uses_longest_arc_and_shortest_diagonal() {
        // Bottom curve spans a longer range than the top curve, and the
        // bottom line slants down so B–C is longer than A–D.
        let top = PolynomialModel::constant(10.0);
        let bottom = PolynomialModel::from_coefficients(vec![50.0, 0.1]);
        let top_arc = integrate_arc_length(&top, 0, 51, 1.0, 100);
        let bottom_arc = integrate_arc_length(&bottom, 0, 81, 1.0, 100);
        let ab = BoundaryCurve { model: &top, arc: &top_arc, near: 0, far: 51 };
        let dc = BoundaryCurve { model: &bottom, arc: &bottom_arc, near: 0, far: 81 };

        let (width, height) = unrolled_size(&ab, &dc);
        let expected_width = 80.0 * (1.0f64 + 0.01).sqrt();
        assert!((width - expected_width).abs() < 1e-9);
        assert!((height - 40.0).abs() < 1e-12);

        let map = build_coordinate_map(&ab, &dc);
        assert_eq!(map.width(), expected_width.ceil() as u32);
        assert_eq!(map.height(), 40);
    }

    #[test]
    fn bottom_pointer_follows_arc_fraction() {
        // Top spans 100 columns, bottom 50: the bottom pointer moves at half speed.
        let top = PolynomialModel::constant(0.0);
        let bottom = PolynomialModel::constant(100.0);
        let top_arc = integrate_arc_length(&top, 0, 101, 1.0, 120);
        let bottom_arc = integrate_arc_length(&bottom, 0, 51, 1.0, 120);
        let ab = BoundaryCurve { model: &top, arc: &top_arc, near: 0, far: 101 };
        let dc = BoundaryCurve { model: &bottom, arc: &bottom_arc, near: 0, far: 51 };

        let map = build_coordinate_map(&ab, &dc);
        assert_eq!(map.width(), 100);
        // Last row lies one spacing short of G on the bottom curve.
        let last = map.height() - 1;
        for dest_x in [0u32, 20, 60, 98] {
            let (top_sx, _) = map.get(dest_x, 0);
            let (bottom_sx, bottom_sy) = map.get(dest_x, last);
            assert!((top_sx - dest_x as f32).abs() < 1e-3);
            let g_x = (dest_x as f32 / 2.0).ceil();
            let along = last as f32 / map.height() as f32;
            let expected = top_sx + (g_x - top_sx) * along;
            assert!((bottom_sx - expected).abs() < 0.05, "column {dest_x}: {bottom_sx} vs {expected}");
            assert!(bottom_sy > 90.0);
        }
    }

    #[test]
    fn coincident_boundaries_repeat_one_pixel() {
        let model = PolynomialModel::constant(30.0);
        let arc = integrate_arc_length(&model, 0, 20, 1.0, 20);
        let ab = BoundaryCurve { model: &model, arc: &arc, near: 0, far: 20 };
        let dc = BoundaryCurve { model: &model, arc: &arc, near: 0, far: 20 };
        // Both diagonals are zero, so nothing is unrolled.
        assert!(build_coordinate_map(&ab, &dc).is_empty());
    }

    #[test]
    fn inverted_segment_yields_degenerate_map() {
        let top = PolynomialModel::constant(10.0);
        let bottom = PolynomialModel::constant(60.0);
        let top_arc = integrate_arc_length(&top, 40, 10, 1.0, 50);
        let bottom_arc = integrate_arc_length(&bottom, 40, 10, 1.0, 50);
        let ab = BoundaryCurve { model: &top, arc: &top_arc, near: 40, far: 10 };
        let dc = BoundaryCurve { model: &bottom, arc: &bottom_arc, near: 40, far: 10 };
        let map = build_coordinate_map(&ab, &dc);
        assert_eq!(map.width(), 0);
    }
}
