// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dewarp pipeline — laser photo in, flattened page out.

use std::path::Path;

use flachwerk_core::error::{FlachwerkError, Result};
use flachwerk_core::DewarpConfig;
use image::{DynamicImage, GenericImageView, RgbImage};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::laser::{LandmarkSet, LaserPair, extract_lasers, laser_mask, locate_landmarks};
use crate::surface::{fit_segment, integrate_arc_length};
use crate::warp::{BoundaryCurve, CoordinateMap, build_coordinate_map, resample};

/// Summary of one dewarp run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DewarpReport {
    pub landmarks: LandmarkSet,
    /// Arc length of the top curve between its landmarks.
    pub top_arc_length: f64,
    /// Arc length of the bottom curve between its landmarks.
    pub bottom_arc_length: f64,
    /// Slope of the straight chord A→B, a measure of page tilt.
    pub top_chord_slope: Option<f64>,
    /// Slope of the straight chord D→C.
    pub bottom_chord_slope: Option<f64>,
    pub output_width: u32,
    pub output_height: u32,
}

/// Result of [`Dewarper::dewarp`].
#[derive(Debug, Clone)]
pub struct DewarpOutput {
    pub image: RgbImage,
    pub report: DewarpReport,
}

/// Flattens a photographed page using a matching laser photo.
///
/// The pipeline runs strictly downstream:
///
/// 1. Threshold and despeckle the laser photo into a binary mask
/// 2. Extract the top and bottom laser curves
/// 3. Locate spine and edge on each curve
/// 4. Fit a polynomial to each curve between its landmarks
/// 5. Integrate arc length along each fit
/// 6. Build the destination-to-source coordinate map
/// 7. Resample the page photo through the map
#[derive(Debug, Clone)]
pub struct Dewarper {
    config: DewarpConfig,
}

impl Dewarper {
    /// Create a dewarper, rejecting an unusable configuration.
    pub fn new(config: DewarpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DewarpConfig {
        &self.config
    }

    /// Run steps 1-3 on a laser photo.
    #[instrument(skip_all)]
    pub fn analyze_lasers(&self, laser_photo: &DynamicImage) -> (LaserPair, LandmarkSet) {
        let mask = laser_mask(laser_photo, self.config.laser_threshold);
        let lasers = extract_lasers(&mask, self.config.leading_gap);
        let landmarks = locate_landmarks(&lasers, &self.config);
        (lasers, landmarks)
    }

    /// Run steps 4-6: fit both curves between their landmarks and unroll
    /// the page into a coordinate map.
    #[instrument(skip_all, fields(width = lasers.top.len()))]
    pub fn build_map(
        &self,
        lasers: &LaserPair,
        landmarks: &LandmarkSet,
    ) -> Result<(CoordinateMap, DewarpReport)> {
        let width = lasers.top.len();
        let ((a, b), (d, c)) = landmarks.segments(self.config.page_side);
        debug!(a, b, d, c, "Page segments");
        if a >= b || d >= c {
            let err = FlachwerkError::DegenerateGeometry(format!(
                "inverted page segment: top {a}..{b}, bottom {d}..{c}"
            ));
            warn!(error = %err, "Continuing with a degenerate segment");
        }

        let top_model = fit_segment(&lasers.top, a, b)?;
        let bottom_model = fit_segment(&lasers.bottom, d, c)?;
        let factor = self.config.height_factor;
        let top_arc = integrate_arc_length(&top_model, a, b, factor, width);
        let bottom_arc = integrate_arc_length(&bottom_model, d, c, factor, width);

        let top = BoundaryCurve {
            model: &top_model,
            arc: &top_arc,
            near: a,
            far: b,
        };
        let bottom = BoundaryCurve {
            model: &bottom_model,
            arc: &bottom_arc,
            near: d,
            far: c,
        };
        let map = build_coordinate_map(&top, &bottom);

        let report = DewarpReport {
            landmarks: landmarks.clone(),
            top_arc_length: top.total_arc(),
            bottom_arc_length: bottom.total_arc(),
            top_chord_slope: top.chord().map(|line| line.slope()),
            bottom_chord_slope: bottom.chord().map(|line| line.slope()),
            output_width: map.width(),
            output_height: map.height(),
        };
        Ok((map, report))
    }

    /// Dewarp `photo` using the laser lines in `laser_photo`.
    ///
    /// Both images must have the same dimensions.
    #[instrument(skip_all, fields(width = photo.width(), height = photo.height()))]
    pub fn dewarp(&self, photo: &DynamicImage, laser_photo: &DynamicImage) -> Result<DewarpOutput> {
        if photo.dimensions() != laser_photo.dimensions() {
            return Err(FlachwerkError::ImageError(format!(
                "page photo is {}x{} but laser photo is {}x{}",
                photo.width(),
                photo.height(),
                laser_photo.width(),
                laser_photo.height()
            )));
        }
        info!(side = %self.config.page_side, frame = %self.config.frame, "Dewarping page");

        let (lasers, landmarks) = self.analyze_lasers(laser_photo);
        let (map, report) = self.build_map(&lasers, &landmarks)?;
        let image = resample(&photo.to_rgb8(), &map);

        info!(
            out_w = report.output_width,
            out_h = report.output_height,
            "Dewarp complete"
        );
        Ok(DewarpOutput { image, report })
    }

    /// Read both photos from disk, dewarp, and write the result to `output`.
    /// The output format is inferred from its extension.
    #[instrument(skip_all, fields(image = %image.as_ref().display(), laser = %laser.as_ref().display()))]
    pub fn dewarp_files(
        &self,
        image: impl AsRef<Path>,
        laser: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<DewarpReport> {
        let photo = open_image(image.as_ref())?;
        let laser_photo = open_image(laser.as_ref())?;
        let result = self.dewarp(&photo, &laser_photo)?;

        result.image.save(output.as_ref()).map_err(|err| {
            FlachwerkError::ImageError(format!(
                "failed to save image to {}: {}",
                output.as_ref().display(),
                err
            ))
        })?;
        info!(path = %output.as_ref().display(), "Dewarped page written");
        Ok(result.report)
    }
}

/// Decode an image file.
fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|err| {
        FlachwerkError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })
}
