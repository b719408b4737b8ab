// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dewarp configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlachwerkError, Result};
use crate::types::{FrameMode, LeadingGap, PageSide};

/// Settings consumed by every pipeline stage.
///
/// Passed by reference into each stage; no stage reads ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DewarpConfig {
    /// Red-channel threshold (0-255) above which a laser-photo pixel counts
    /// as laser light. Higher values ignore more reflected light.
    pub laser_threshold: u8,
    /// Which side of the spine the page is on.
    pub page_side: PageSide,
    /// Whether the shot frames one page or both.
    pub frame: FrameMode,
    /// Multiplier applied to the laser curve to estimate true page height.
    /// Too low foreshortens text near the spine, too high elongates it.
    /// Normally between 1.0 and 5.0.
    pub height_factor: f64,
    /// Fill policy for columns before the first laser detection.
    pub leading_gap: LeadingGap,
}

impl Default for DewarpConfig {
    fn default() -> Self {
        Self {
            laser_threshold: 40,
            page_side: PageSide::Odd,
            frame: FrameMode::Single,
            height_factor: 1.0,
            leading_gap: LeadingGap::Seed,
        }
    }
}

impl DewarpConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// An unknown page side or frame is a configuration error, the same as
    /// on the command line; other malformed JSON is a serialization error.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        if let Some(side) = value.get("page_side").and_then(|v| v.as_str()) {
            side.parse::<PageSide>()?;
        }
        if let Some(frame) = value.get("frame").and_then(|v| v.as_str()) {
            frame.parse::<FrameMode>()?;
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if !self.height_factor.is_finite() || self.height_factor <= 0.0 {
            return Err(FlachwerkError::Configuration(format!(
                "height factor must be a positive number, got {}",
                self.height_factor
            )));
        }
        Ok(())
    }
}
