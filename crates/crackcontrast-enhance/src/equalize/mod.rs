// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region-aware tanh equalizer: segmentation, histogram peak estimation, peak
// fusion and tanh remapping, run strictly in that order.

pub mod fusion;
pub mod histogram;
pub mod remap;
pub mod segment;

use crackcontrast_core::error::{CrackContrastError, Result};
use crackcontrast_core::{EqualizerConfig, Histogram, TanhDiagnostics};
use image::{DynamicImage, GrayImage};
use tracing::{debug, info, instrument};

pub use fusion::{ReferencePeak, fuse_peaks};
pub use histogram::{RegionEstimate, estimate_regions};
pub use remap::{ToneCurve, apply_tone_curve};
pub use segment::{ExclusionMask, exclusion_mask};

/// Result of one enhancement run.
#[derive(Debug, Clone)]
pub struct Equalization {
    /// The grayscale input actually processed.
    pub gray: GrayImage,
    /// The enhanced image, same dimensions as `gray`.
    pub equalized: GrayImage,
    /// Histogram reported for the input. For the tanh method this is the
    /// included-region histogram.
    pub original_histogram: Histogram,
    /// Histogram of `equalized`.
    pub equalized_histogram: Histogram,
    /// Intermediate values of the tanh method; `None` for other methods.
    pub diagnostics: Option<TanhDiagnostics>,
}

/// Equalize `image` with the region-aware tanh method.
///
/// Multi-channel images are converted to 8-bit luma first.
pub fn equalize(image: &DynamicImage, config: &EqualizerConfig) -> Result<Equalization> {
    equalize_gray(&image.to_luma8(), config)
}

/// Equalize an 8-bit grayscale image with the region-aware tanh method.
///
/// ## Pipeline
///
/// 1. Exclusion mask from bright connected blobs larger than
///    `exclusion_area_ratio` of the image
/// 2. Included/excluded histograms, Gaussian smoothing, peak per region
/// 3. Area-weighted reference peak
/// 4. Tanh tone curve applied to included pixels, clipped to the input range
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn equalize_gray(gray: &GrayImage, config: &EqualizerConfig) -> Result<Equalization> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(CrackContrastError::InvalidInput(format!(
            "image is empty ({width}x{height})"
        )));
    }
    config.validate()?;

    // Stage 1: Region segmentation.
    let mask = exclusion_mask(gray, config.binary_threshold, config.exclusion_area_ratio);

    // Stage 2: Histogram estimation.
    let regions = estimate_regions(
        gray,
        &mask,
        config.histogram_masking,
        config.smoothing_sigma,
    )?;

    // Stage 3: Peak fusion.
    let included_area_ratio = mask.included_ratio();
    let reference = fuse_peaks(
        regions.included_peak.bin,
        regions.excluded_peak.bin,
        included_area_ratio,
    );

    // Stage 4: Tanh remapping.
    let curve = ToneCurve::tanh(reference);
    let equalized = apply_tone_curve(gray, &mask, &curve)?;
    let equalized_histogram = Histogram::from_samples(equalized.as_raw());
    debug!("Tone curve applied");

    let diagnostics = TanhDiagnostics {
        included_peak: regions.included_peak,
        excluded_peak: regions.excluded_peak,
        included_area_ratio,
        reference_peak: reference.value(),
        excluded_pixels: regions.excluded_pixels,
    };
    info!(
        reference_peak = diagnostics.reference_peak,
        included_area_ratio,
        excluded_pixels = diagnostics.excluded_pixels,
        "Tanh equalization complete"
    );

    Ok(Equalization {
        gray: gray.clone(),
        equalized,
        original_histogram: regions.included_histogram,
        equalized_histogram,
        diagnostics: Some(diagnostics),
    })
}
