// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command-line driver.
//
// Every technical error is mapped to plain English with a clear suggestion.

use serde::{Deserialize, Serialize};

use crate::error::CrackContrastError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// The user must change something (a path, a flag) and run again.
    ActionRequired,
    /// Running again will not help: the input itself cannot be enhanced.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: impl Into<String>, suggestion: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity,
        }
    }
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `CrackContrastError` into a `HumanError`.
pub fn humanize_error(err: &CrackContrastError) -> HumanError {
    match err {
        CrackContrastError::InvalidInput(detail) if detail.contains("empty") => HumanError::new(
            "The image has no pixels.",
            "Check that the file is a real photograph, not a zero-size placeholder.",
            Severity::Permanent,
        ),

        CrackContrastError::InvalidInput(detail) if detail.contains("mask") => HumanError::new(
            "The exclusion mask was built for a different image size.",
            format!("Rebuild the mask from the image being enhanced. ({detail})"),
            Severity::Permanent,
        ),

        CrackContrastError::InvalidInput(detail) => HumanError::new(
            "One of the equalizer settings is out of range.",
            format!("Fix the setting and run again. ({detail})"),
            Severity::ActionRequired,
        ),

        CrackContrastError::UnsupportedMethod(name) => HumanError::new(
            format!("\"{name}\" is not a known enhancement method."),
            "Use either \"tanh\" or \"linear\".",
            Severity::ActionRequired,
        ),

        CrackContrastError::ImageError(_) => HumanError::new(
            "There's a problem with this image.",
            "It may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.",
            Severity::Permanent,
        ),

        CrackContrastError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "It may have been moved or deleted. Check the path and try again.",
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "Permission denied while reading or writing a file.",
                "Check the file and directory permissions.",
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, the disk may be full.",
                Severity::ActionRequired,
            ),
        },

        CrackContrastError::Serialization(_) => HumanError::new(
            "A JSON file could not be read or written.",
            "Check that the configuration file is valid JSON.",
            Severity::ActionRequired,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_is_permanent() {
        let err = CrackContrastError::InvalidInput("image is empty (0x0)".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.message.contains("no pixels"));
    }

    #[test]
    fn bad_setting_mentions_detail() {
        let detail = "exclusion_area_ratio must lie in [0, 1]";
        let human = humanize_error(&CrackContrastError::InvalidInput(detail.into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("exclusion_area_ratio"));
    }

    #[test]
    fn mismatched_mask_is_not_a_setting_problem() {
        let detail = "exclusion mask is 2x2 but the image is 4x4";
        let human = humanize_error(&CrackContrastError::InvalidInput(detail.into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.message.contains("different image size"));
    }

    #[test]
    fn missing_file_asks_for_action() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let human = humanize_error(&CrackContrastError::Io(io_err));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("couldn't be found"));
    }

    #[test]
    fn unsupported_method_names_alternatives() {
        let err = CrackContrastError::UnsupportedMethod("clahe".into());
        let human = humanize_error(&err);
        assert!(human.message.contains("clahe"));
        assert!(human.suggestion.contains("tanh"));
    }

    #[test]
    fn severity_serialises_in_kebab_case() {
        let json = serde_json::to_string(&Severity::ActionRequired).unwrap();
        assert_eq!(json, "\"action-required\"");
    }
}
