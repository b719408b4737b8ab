// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Flachwerk.

use thiserror::Error;

/// Top-level error type for all Flachwerk operations.
///
/// Only `Configuration` and the I/O family abort a run. `LandmarkNotFound` and
/// `DegenerateGeometry` are produced so they can be logged and reported, while
/// the pipeline carries on with a default landmark or a degenerate sample.
#[derive(Debug, Error)]
pub enum FlachwerkError {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Geometry --
    #[error("{landmark} not found (candidates: {candidates:?})")]
    LandmarkNotFound {
        landmark: String,
        candidates: Vec<usize>,
    },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Images --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlachwerkError {
    /// Whether the pipeline must stop on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::LandmarkNotFound { .. } | Self::DegenerateGeometry(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FlachwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_are_not_fatal() {
        let missing = FlachwerkError::LandmarkNotFound {
            landmark: "top spine".into(),
            candidates: vec![],
        };
        assert!(!missing.is_fatal());
        assert!(!FlachwerkError::DegenerateGeometry("E == G".into()).is_fatal());
        assert!(FlachwerkError::Configuration("page side".into()).is_fatal());
    }

    #[test]
    fn landmark_message_lists_candidates() {
        let err = FlachwerkError::LandmarkNotFound {
            landmark: "bottom spine".into(),
            candidates: vec![3, 7],
        };
        assert_eq!(err.to_string(), "bottom spine not found (candidates: [3, 7])");
    }
}
