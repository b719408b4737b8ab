// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Warp stage — dense destination-to-source coordinate maps and resampling.

pub mod map;
pub mod resample;

pub use map::{BoundaryCurve, CoordinateMap, build_coordinate_map};
pub use resample::resample;
