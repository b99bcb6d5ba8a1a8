// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Equalizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CrackContrastError, Result};

/// How the per-region histograms treat pixels that belong to the other region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistogramMasking {
    /// Masked-out pixels are counted as intensity 0. Inflates bin 0 of each
    /// region histogram by the pixel count of the other region.
    #[default]
    SentinelZero,
    /// Masked-out pixels are not counted at all.
    RegionOnly,
}

/// Tunable parameters of the region-aware tanh equalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizerConfig {
    /// Pixels at or above this intensity are candidates for dominant blobs
    /// (default 150).
    pub binary_threshold: u8,
    /// A connected blob whose area exceeds this fraction of the image is
    /// excluded from remapping (default 0.2).
    pub exclusion_area_ratio: f64,
    /// Standard deviation, in bins, of the histogram smoothing kernel
    /// (default 2.0).
    pub smoothing_sigma: f64,
    /// Treatment of masked-out pixels in the region histograms.
    pub histogram_masking: HistogramMasking,
}

impl Default for EqualizerConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 150,
            exclusion_area_ratio: 0.2,
            smoothing_sigma: 2.0,
            histogram_masking: HistogramMasking::SentinelZero,
        }
    }
}

impl EqualizerConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.exclusion_area_ratio) {
            return Err(CrackContrastError::InvalidInput(format!(
                "exclusion_area_ratio must lie in [0, 1], got {}",
                self.exclusion_area_ratio
            )));
        }
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma < 0.0 {
            return Err(CrackContrastError::InvalidInput(format!(
                "smoothing_sigma must be a non-negative finite number, got {}",
                self.smoothing_sigma
            )));
        }
        Ok(())
    }
}
