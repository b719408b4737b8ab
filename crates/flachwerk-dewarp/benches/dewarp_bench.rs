// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the flachwerk-dewarp crate. Covers coordinate map
// construction on its own and the full pipeline on a synthetic page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use flachwerk_core::DewarpConfig;
use flachwerk_dewarp::Dewarper;
use flachwerk_dewarp::surface::{PolynomialModel, integrate_arc_length};
use flachwerk_dewarp::warp::{BoundaryCurve, build_coordinate_map};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark map construction between a gently curved top boundary and a
/// straight bottom boundary on a 640-column page.
fn bench_coordinate_map(c: &mut Criterion) {
    let top = PolynomialModel::from_coefficients(vec![80.0, 0.05, -0.0001]);
    let bottom = PolynomialModel::constant(420.0);
    let top_arc = integrate_arc_length(&top, 20, 620, 1.5, 640);
    let bottom_arc = integrate_arc_length(&bottom, 20, 620, 1.5, 640);

    c.bench_function("coordinate_map (600 columns)", |b| {
        b.iter(|| {
            let ab = BoundaryCurve {
                model: &top,
                arc: &top_arc,
                near: 20,
                far: 620,
            };
            let dc = BoundaryCurve {
                model: &bottom,
                arc: &bottom_arc,
                near: 20,
                far: 620,
            };
            black_box(build_coordinate_map(black_box(&ab), black_box(&dc)));
        });
    });
}

/// Benchmark the full pipeline on a 320x240 synthetic laser/page pair.
///
/// The lasers are straight, so landmark detection takes its fallback path,
/// which is the realistic cost floor of a run.
fn bench_full_dewarp(c: &mut Criterion) {
    let (width, height) = (320u32, 240u32);
    let laser = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, y| {
        if y.abs_diff(60) <= 2 || y.abs_diff(180) <= 2 {
            Rgb([250, 0, 0])
        } else {
            Rgb([0, 0, 0])
        }
    }));
    let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([x as u8, y as u8, 128])
    }));
    let dewarper = Dewarper::new(DewarpConfig::default()).expect("default config is valid");

    c.bench_function("dewarp (320x240)", |b| {
        b.iter(|| {
            let result = dewarper.dewarp(black_box(&photo), black_box(&laser));
            black_box(result.expect("synthetic page dewarps"));
        });
    });
}

criterion_group!(benches, bench_coordinate_map, bench_full_dewarp);
criterion_main!(benches);
