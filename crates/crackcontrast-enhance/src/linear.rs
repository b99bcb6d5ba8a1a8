// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Linear histogram equalization: the classic cumulative-histogram mapping,
// offered as an alternative to the tanh equalizer.

use crackcontrast_core::Histogram;
use crackcontrast_core::error::{CrackContrastError, Result};
use image::DynamicImage;
use imageproc::contrast::equalize_histogram;
use tracing::{info, instrument};

use crate::equalize::Equalization;

/// Equalize `image` by mapping each intensity through the normalised
/// cumulative histogram of the whole image.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn equalize_linear(image: &DynamicImage) -> Result<Equalization> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CrackContrastError::InvalidInput(format!(
            "image is empty ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let gray = image.to_luma8();
    let equalized = equalize_histogram(&gray);
    info!("Linear equalization complete");

    Ok(Equalization {
        original_histogram: Histogram::from_samples(gray.as_raw()),
        equalized_histogram: Histogram::from_samples(equalized.as_raw()),
        gray,
        equalized,
        diagnostics: None,
    })
}
