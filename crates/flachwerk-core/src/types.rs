// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Flachwerk dewarper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlachwerkError;

/// Which side of the spine the page to dewarp lies on.
///
/// Odd pages sit to the right of the spine and read spine → edge left to
/// right; even pages sit to the left and read edge → spine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSide {
    #[serde(alias = "right")]
    Odd,
    #[serde(alias = "left")]
    Even,
}

impl FromStr for PageSide {
    type Err = FlachwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "odd" | "right" => Ok(Self::Odd),
            "even" | "left" => Ok(Self::Even),
            other => Err(FlachwerkError::Configuration(format!(
                "the page must be either even/left or odd/right, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "odd"),
            Self::Even => write!(f, "even"),
        }
    }
}

/// How many pages the camera shot is framed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Camera centred on one page; the spine lies near one image border.
    Single,
    /// Camera centred on the spine; the spine lies in the middle third.
    Double,
}

impl FromStr for FrameMode {
    type Err = FlachwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            other => Err(FlachwerkError::Configuration(format!(
                "the frame must be either single or double, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// What a laser curve holds in the columns before its first detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadingGap {
    /// Hold the fixed seed value (`0.0`) until the first detection.
    #[default]
    Seed,
    /// Fill the leading run with the first detected value.
    Backfill,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_side_accepts_aliases() {
        assert_eq!("odd".parse::<PageSide>().unwrap(), PageSide::Odd);
        assert_eq!("Right".parse::<PageSide>().unwrap(), PageSide::Odd);
        assert_eq!("even".parse::<PageSide>().unwrap(), PageSide::Even);
        assert_eq!("LEFT".parse::<PageSide>().unwrap(), PageSide::Even);
    }

    #[test]
    fn page_side_rejects_unknown_value() {
        let err = "middle".parse::<PageSide>().unwrap_err();
        assert!(matches!(err, FlachwerkError::Configuration(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn frame_mode_round_trips_through_display() {
        for mode in [FrameMode::Single, FrameMode::Double] {
            assert_eq!(mode.to_string().parse::<FrameMode>().unwrap(), mode);
        }
        assert!("triple".parse::<FrameMode>().is_err());
    }

    #[test]
    fn page_side_deserializes_aliases() {
        let side: PageSide = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(side, PageSide::Even);
        assert!(serde_json::from_str::<PageSide>("\"up\"").is_err());
    }
}
