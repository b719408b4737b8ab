// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Laser mask — thresholds the red channel of a lights-out laser photo and
// despeckles the result.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;
use tracing::{debug, instrument};

/// Radius of the despeckle median filter (a 5x5 window).
pub const MEDIAN_RADIUS: u32 = 2;

/// Build a binary (0/255) laser mask from a laser photo.
///
/// A pixel is lit when its red channel exceeds `threshold`. The thresholded
/// image is then median filtered so isolated reflections drop out.
#[instrument(skip(photo), fields(width = photo.width(), height = photo.height()))]
pub fn laser_mask(photo: &DynamicImage, threshold: u8) -> GrayImage {
    let rgb = photo.to_rgb8();
    let thresholded = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let red = rgb.get_pixel(x, y).0[0];
        Luma([if red > threshold { 255u8 } else { 0u8 }])
    });

    let mask = median_filter(&thresholded, MEDIAN_RADIUS, MEDIAN_RADIUS);
    debug!(
        lit = mask.pixels().filter(|p| p.0[0] == 255).count(),
        "Laser mask extracted"
    );
    mask
}
