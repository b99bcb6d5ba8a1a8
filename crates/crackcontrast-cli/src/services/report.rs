// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run reports: per-image contrast scores, histograms and tanh diagnostics,
// serialised as JSON in place of on-screen plots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use crackcontrast_core::error::Result;
use crackcontrast_core::human_errors::{Severity, humanize_error};
use crackcontrast_core::{CrackContrastError, EqualizerConfig, Histogram, Method, TanhDiagnostics};
use serde::{Deserialize, Serialize};

/// Outcome of enhancing one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Laplacian-variance score of the grayscale input.
    pub contrast_before: f64,
    /// Laplacian-variance score of the enhanced output.
    pub contrast_after: f64,
    pub original_histogram: Histogram,
    pub equalized_histogram: Histogram,
    pub diagnostics: Option<TanhDiagnostics>,
}

/// An image that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedImage {
    pub source: PathBuf,
    pub error: String,
    pub suggestion: String,
    /// Whether the file can succeed on a later run once the cause is fixed.
    pub severity: Severity,
}

impl FailedImage {
    pub fn new(source: PathBuf, err: &CrackContrastError) -> Self {
        let human = humanize_error(err);
        Self {
            source,
            error: err.to_string(),
            suggestion: human.suggestion,
            severity: human.severity,
        }
    }
}

/// Everything one CLI run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub method: Method,
    pub config: EqualizerConfig,
    pub images: Vec<ImageReport>,
    pub failures: Vec<FailedImage>,
}

impl RunReport {
    pub fn new(method: Method, config: EqualizerConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            method,
            config,
            images: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
