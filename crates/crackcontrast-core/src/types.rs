// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared between the enhancement engine and the CLI.

use serde::{Deserialize, Serialize};

use crate::error::CrackContrastError;

/// Number of intensity bins in every histogram.
pub const HISTOGRAM_BINS: usize = 256;

/// An 8-bit intensity histogram: exactly 256 bins, index = intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    bins: Vec<u64>,
}

impl Histogram {
    /// An all-zero histogram.
    pub fn new() -> Self {
        Self {
            bins: vec![0; HISTOGRAM_BINS],
        }
    }

    /// Count every sample of `samples` into a fresh histogram.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a u8>) -> Self {
        let mut histogram = Self::new();
        for &value in samples {
            histogram.record(value);
        }
        histogram
    }

    /// Add one sample at intensity `value`.
    pub fn record(&mut self, value: u8) {
        self.bins[value as usize] += 1;
    }

    /// Count stored at intensity `value`.
    pub fn count(&self, value: u8) -> u64 {
        self.bins[value as usize]
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Total number of samples across all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// How a region's peak bin was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeakSource {
    /// The tallest interior local maximum of the smoothed histogram.
    LocalMaximum,
    /// No local maximum existed; the global argmax was used instead.
    GlobalArgmax,
}

/// The most prominent intensity of a region's smoothed histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    pub bin: u8,
    pub source: PeakSource,
}

/// Intermediate values of one tanh equalization, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TanhDiagnostics {
    pub included_peak: Peak,
    pub excluded_peak: Peak,
    /// Fraction of pixels outside every dominant blob, in [0, 1].
    pub included_area_ratio: f64,
    /// Centre of the tanh curve (area-weighted blend of both peaks, >= 1).
    pub reference_peak: f64,
    /// Number of pixels left untouched because they belong to a dominant blob.
    pub excluded_pixels: u64,
}

/// Contrast enhancement algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Region-aware tanh remapping.
    #[default]
    Tanh,
    /// Classic cumulative-histogram equalization.
    Linear,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Tanh => "tanh",
            Method::Linear => "linear",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = CrackContrastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tanh" => Ok(Method::Tanh),
            "linear" => Ok(Method::Linear),
            other => Err(CrackContrastError::UnsupportedMethod(other.to_owned())),
        }
    }
}
