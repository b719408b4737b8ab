// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flachwerk-dewarp — Laser-guided page dewarping.
//
// Provides laser analysis (mask extraction, height curves, spine and edge
// landmarks), surface modelling (binned polynomial fits, arc-length tables),
// and the warp stage (dense coordinate map construction and resampling).

pub mod dewarper;
pub mod laser;
pub mod surface;
pub mod warp;

// Re-export the primary types so callers can use `flachwerk_dewarp::Dewarper` etc.
pub use dewarper::{DewarpOutput, DewarpReport, Dewarper};
pub use laser::curve::LaserCurve;
pub use laser::landmark::LandmarkSet;
pub use surface::arc::ArcLengthTable;
pub use surface::fit::PolynomialModel;
pub use warp::map::CoordinateMap;
