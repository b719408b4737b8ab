// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::FlachwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run finished, but the result may be less accurate.
    Degraded,
    /// User must change an option or an input file.
    ActionRequired,
    /// Cannot be fixed by changing options, e.g. an unreadable image.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `FlachwerkError` into a `HumanError`.
pub fn humanize_error(err: &FlachwerkError) -> HumanError {
    match err {
        FlachwerkError::Configuration(detail) => HumanError {
            message: "One of the options is not valid.".into(),
            suggestion: format!(
                "Check --page (odd, even, right or left), --frame and --height-factor. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        FlachwerkError::LandmarkNotFound { landmark, .. } => HumanError {
            message: format!("The {landmark} could not be found on the laser lines."),
            suggestion: "Try a different --laser-threshold, or check that --page and --frame match the photo.".into(),
            severity: Severity::Degraded,
        },

        FlachwerkError::DegenerateGeometry(detail) => HumanError {
            message: "The page outline collapsed to a line or a point.".into(),
            suggestion: format!(
                "Make sure both laser lines cross the whole page in the laser photo. ({detail})"
            ),
            severity: Severity::Degraded,
        },

        FlachwerkError::ImageError(detail) => HumanError {
            message: "An image could not be read or written.".into(),
            suggestion: format!(
                "Check that the file exists and is a JPEG, PNG or TIFF image. ({detail})"
            ),
            severity: Severity::Permanent,
        },

        FlachwerkError::Io(io_err) => HumanError {
            message: "A file could not be opened.".into(),
            suggestion: format!("Check the path and its permissions. ({io_err})"),
            severity: Severity::ActionRequired,
        },

        FlachwerkError::Serialization(json_err) => HumanError {
            message: "The configuration file is not valid.".into(),
            suggestion: format!("Fix the JSON in the --config file. ({json_err})"),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_requires_action() {
        let human = humanize_error(&FlachwerkError::Configuration("page side".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("--page"));
    }

    #[test]
    fn missing_landmark_is_degraded() {
        let human = humanize_error(&FlachwerkError::LandmarkNotFound {
            landmark: "top spine".into(),
            candidates: vec![],
        });
        assert_eq!(human.severity, Severity::Degraded);
        assert!(human.message.contains("top spine"));
    }

    #[test]
    fn image_errors_are_permanent() {
        let human = humanize_error(&FlachwerkError::ImageError("truncated".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("truncated"));
    }
}
