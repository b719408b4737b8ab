// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Surface modelling — polynomial fits of the laser curves and arc length
// along them.

pub mod arc;
pub mod fit;
pub mod geometry;

pub use arc::{ArcLengthTable, integrate_arc_length};
pub use fit::{PolynomialModel, fit_segment};
pub use geometry::{Line, distance};
