// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// crackcontrast-enhance: Contrast enhancement for grayscale crack photographs.
//
// Provides the region-aware tanh equalizer (segmentation, histogram peak
// estimation, peak fusion, tanh remapping), a classic linear histogram
// equalization, a Laplacian-variance contrast score, and image decode/encode.

pub mod equalize;
pub mod image;
pub mod linear;
pub mod score;

// Re-export the primary entry points so callers can use
// `crackcontrast_enhance::equalize` etc.
pub use equalize::{Equalization, equalize, equalize_gray};
pub use crate::image::processor::ImageProcessor;
pub use linear::equalize_linear;
pub use score::{ContrastMetric, LaplacianVariance};

use ::image::DynamicImage;
use crackcontrast_core::error::Result;
use crackcontrast_core::{EqualizerConfig, Method};

/// Run the selected enhancement `method` on `image`.
///
/// `config` only affects [`Method::Tanh`].
pub fn enhance(
    method: Method,
    image: &DynamicImage,
    config: &EqualizerConfig,
) -> Result<Equalization> {
    match method {
        Method::Tanh => equalize(image, config),
        Method::Linear => equalize_linear(image),
    }
}
