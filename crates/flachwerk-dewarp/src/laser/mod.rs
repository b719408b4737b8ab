// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Laser analysis — binary mask extraction, per-column height curves, and
// spine/edge landmark location.

pub mod curve;
pub mod landmark;
pub mod mask;

pub use curve::{LaserCurve, LaserPair, extract_curve, extract_lasers};
pub use landmark::{Landmark, LandmarkSet, locate_landmarks};
pub use mask::laser_mask;
