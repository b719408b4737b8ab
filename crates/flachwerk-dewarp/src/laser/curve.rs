// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Laser curve extraction — one height value per image column.

use std::ops::{Index, Range};

use flachwerk_core::LeadingGap;
use image::GrayImage;
use tracing::{debug, instrument};

/// Mask intensity above which a pixel belongs to the laser line.
pub const LIT_THRESHOLD: u8 = 200;

/// Height held by columns that precede the first detection under
/// [`LeadingGap::Seed`]. Those columns are not back-filled.
pub const LEADING_GAP_SEED: f64 = 0.0;

/// Detected laser height for every column of an image.
///
/// Always exactly one finite value per column; columns without a detection
/// hold the previous resolved value.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserCurve {
    heights: Vec<f64>,
}

impl LaserCurve {
    /// Wrap a precomputed height sequence.
    pub fn from_heights(heights: Vec<f64>) -> Self {
        Self { heights }
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

impl Index<usize> for LaserCurve {
    type Output = f64;

    fn index(&self, x: usize) -> &f64 {
        &self.heights[x]
    }
}

/// The two laser lines of one laser photo.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserPair {
    /// Curve found in the top half of the image.
    pub top: LaserCurve,
    /// Curve found in the bottom half of the image.
    pub bottom: LaserCurve,
}

/// Centre of the lit run in each column, or `None` when nothing is lit.
///
/// The centre is the midpoint of the first and last lit row, which keeps a
/// blurred several-pixel-thick line centred.
fn column_midpoints(mask: &GrayImage, rows: Range<u32>) -> Vec<Option<f64>> {
    let rows = rows.start.min(mask.height())..rows.end.min(mask.height());
    (0..mask.width())
        .map(|x| {
            let mut lit = rows
                .clone()
                .filter(|&y| mask.get_pixel(x, y).0[0] > LIT_THRESHOLD);
            let first = lit.next()?;
            let last = lit.last().unwrap_or(first);
            Some((first + last) as f64 / 2.0)
        })
        .collect()
}

/// Extract the laser curve lying within `rows` of a binary mask.
///
/// Columns without a lit pixel hold the last resolved height (zero-order hold
/// to the right). No interpolation between detections is attempted.
#[instrument(skip(mask), fields(width = mask.width(), rows = ?rows))]
pub fn extract_curve(mask: &GrayImage, rows: Range<u32>, leading_gap: LeadingGap) -> LaserCurve {
    let midpoints = column_midpoints(mask, rows);

    let mut last_known = match leading_gap {
        LeadingGap::Seed => LEADING_GAP_SEED,
        LeadingGap::Backfill => midpoints
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(LEADING_GAP_SEED),
    };

    let detected = midpoints.iter().filter(|m| m.is_some()).count();
    let heights = midpoints
        .into_iter()
        .map(|midpoint| {
            if let Some(y) = midpoint {
                last_known = y;
            }
            last_known
        })
        .collect::<Vec<_>>();

    debug!(detected, columns = heights.len(), "Laser curve extracted");
    LaserCurve { heights }
}

/// Extract the top (rows `[0, h/2)`) and bottom (rows `[h/2, h)`) laser curves.
pub fn extract_lasers(mask: &GrayImage, leading_gap: LeadingGap) -> LaserPair {
    let half = mask.height() / 2;
    LaserPair {
        top: extract_curve(mask, 0..half, leading_gap),
        bottom: extract_curve(mask, half..mask.height(), leading_gap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_with(width: u32, height: u32, lit: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in lit {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    #[test]
    fn midpoint_of_thick_band() {
        let mask = mask_with(3, 20, &[(0, 4), (0, 5), (0, 6), (0, 9), (1, 7), (2, 2), (2, 3)]);
        let curve = extract_curve(&mask, 0..20, LeadingGap::Seed);
        assert_eq!(curve.heights(), &[6.5, 7.0, 2.5]);
    }

    #[test]
    fn gaps_hold_previous_value_without_interpolating() {
        let mask = mask_with(6, 10, &[(0, 2), (3, 8), (4, 8)]);
        let curve = extract_curve(&mask, 0..10, LeadingGap::Seed);
        assert_eq!(curve.heights(), &[2.0, 2.0, 2.0, 8.0, 8.0, 8.0]);
    }

    /// Known quirk: columns before the first detection keep the seed value
    /// instead of the first detected height.
    #[test]
    fn leading_gap_keeps_seed_value() {
        let mask = mask_with(5, 10, &[(2, 6)]);
        let curve = extract_curve(&mask, 0..10, LeadingGap::Seed);
        assert_eq!(curve.heights(), &[LEADING_GAP_SEED, LEADING_GAP_SEED, 6.0, 6.0, 6.0]);
    }

    #[test]
    fn leading_gap_backfill_uses_first_detection() {
        let mask = mask_with(5, 10, &[(2, 6), (4, 1)]);
        let curve = extract_curve(&mask, 0..10, LeadingGap::Backfill);
        assert_eq!(curve.heights(), &[6.0, 6.0, 6.0, 6.0, 1.0]);
    }

    #[test]
    fn empty_mask_yields_defined_values_for_every_column() {
        let mask = GrayImage::new(17, 9);
        let pair = extract_lasers(&mask, LeadingGap::Seed);
        for curve in [&pair.top, &pair.bottom] {
            assert_eq!(curve.len(), 17);
            assert!(curve.heights().iter().all(|h| h.is_finite()));
        }
    }

    #[test]
    fn lasers_split_at_half_height() {
        let mask = mask_with(2, 10, &[(0, 1), (1, 2), (0, 7), (1, 8)]);
        let pair = extract_lasers(&mask, LeadingGap::Seed);
        assert_eq!(pair.top.heights(), &[1.0, 2.0]);
        assert_eq!(pair.bottom.heights(), &[7.0, 8.0]);
    }

    #[test]
    fn dim_pixels_are_ignored() {
        let mut mask = GrayImage::new(1, 6);
        mask.put_pixel(0, 1, Luma([LIT_THRESHOLD]));
        mask.put_pixel(0, 4, Luma([LIT_THRESHOLD + 1]));
        let curve = extract_curve(&mask, 0..6, LeadingGap::Seed);
        assert_eq!(curve[0], 4.0);
    }
}
