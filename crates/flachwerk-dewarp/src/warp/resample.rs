// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resampling — applies a coordinate map to the page photo.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_into_with};
use tracing::{info, instrument};

use super::map::CoordinateMap;

/// Fill colour for destination pixels whose source lies outside the photo.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A coordinate the interpolator always rejects.
const OUTSIDE: (f32, f32) = (-1.0, -1.0);

/// Sample `source` at the map's coordinates with bilinear interpolation.
///
/// The output has the map's dimensions. Every source coordinate inside
/// `[0, w-1] x [0, h-1]` is sampled, including the last column and row;
/// anything outside becomes [`BACKGROUND`].
#[instrument(skip_all, fields(map_w = map.width(), map_h = map.height()))]
pub fn resample(source: &RgbImage, map: &CoordinateMap) -> RgbImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return RgbImage::from_pixel(map.width(), map.height(), BACKGROUND);
    }
    let mut output = RgbImage::new(map.width(), map.height());
    if map.is_empty() {
        return output;
    }

    // The bilinear kernel reads one pixel right and below, so the last
    // column and row are repeated once to keep them addressable.
    let padded = RgbImage::from_fn(width + 1, height + 1, |x, y| {
        *source.get_pixel(x.min(width - 1), y.min(height - 1))
    });
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;

    warp_into_with(
        &padded,
        |x, y| {
            let (sx, sy) = map.get(x as u32, y as u32);
            if (0.0..=max_x).contains(&sx) && (0.0..=max_y).contains(&sy) {
                (sx, sy)
            } else {
                OUTSIDE
            }
        },
        Interpolation::Bilinear,
        BACKGROUND,
        &mut output,
    );

    info!(
        width = output.width(),
        height = output.height(),
        "Page resampled"
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn output_takes_map_dimensions() {
        let out = resample(&gradient(30, 20), &CoordinateMap::new(12, 5));
        assert_eq!(out.dimensions(), (12, 5));
    }

    #[test]
    fn integer_coordinates_copy_source_pixels() {
        let source = gradient(30, 20);
        let mut map = CoordinateMap::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                map.set(x, y, ((x + 10) as f32, (y + 5) as f32));
            }
        }
        let out = resample(&source, &map);
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(10, 5));
        assert_eq!(out.get_pixel(3, 2), source.get_pixel(13, 7));
    }

    #[test]
    fn out_of_bounds_sources_are_background() {
        let mut map = CoordinateMap::new(2, 1);
        map.set(0, 0, (-50.0, 3.0));
        map.set(1, 0, (3.0, 500.0));
        let out = resample(&gradient(10, 10), &map);
        assert_eq!(*out.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*out.get_pixel(1, 0), BACKGROUND);
    }

    #[test]
    fn last_column_and_row_are_sampled() {
        let source = gradient(10, 10);
        let mut map = CoordinateMap::new(4, 1);
        map.set(0, 0, (9.0, 4.0));
        map.set(1, 0, (4.0, 9.0));
        map.set(2, 0, (9.0, 9.0));
        map.set(3, 0, (8.0, 4.0));
        let out = resample(&source, &map);
        assert_eq!(*out.get_pixel(0, 0), Rgb([9, 4, 7]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([4, 9, 7]));
        assert_eq!(*out.get_pixel(2, 0), Rgb([9, 9, 7]));
        assert_eq!(*out.get_pixel(3, 0), Rgb([8, 4, 7]));
    }

    #[test]
    fn just_past_the_last_pixel_is_background() {
        let mut map = CoordinateMap::new(2, 1);
        map.set(0, 0, (9.5, 4.0));
        map.set(1, 0, (4.0, 9.01));
        let out = resample(&gradient(10, 10), &map);
        assert_eq!(*out.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*out.get_pixel(1, 0), BACKGROUND);
    }

    #[test]
    fn empty_map_gives_empty_image() {
        let out = resample(&gradient(10, 10), &CoordinateMap::new(0, 7));
        assert_eq!(out.dimensions(), (0, 7));
    }
}
