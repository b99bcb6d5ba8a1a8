// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: the decode/encode boundary around the enhancement
// algorithms. Operates on in-memory images using the `image` crate.

use crackcontrast_core::error::CrackContrastError;
use crackcontrast_core::{EqualizerConfig, Method};
use image::{DynamicImage, GrayImage, ImageFormat};
use tracing::{debug, info, instrument};

use crate::equalize::Equalization;

/// A single decoded image on its way through the enhancer.
///
/// ```ignore
/// let result = ImageProcessor::open("crack.jpg")?
///     .enhance(Method::Tanh, &EqualizerConfig::default())?;
/// ImageProcessor::save_gray(&result.equalized, "crack_out.png")?;
/// ```
pub struct ImageProcessor {
    /// The decoded source image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, CrackContrastError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            CrackContrastError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, CrackContrastError> {
        let img = image::load_from_memory(data).map_err(|err| {
            CrackContrastError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    // -- Accessors ------------------------------------------------------------

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Single-channel 8-bit view of the image (luma conversion for color).
    pub fn to_gray(&self) -> GrayImage {
        self.image.to_luma8()
    }

    // -- Enhancement ----------------------------------------------------------

    /// Run `method` over the image.
    pub fn enhance(
        &self,
        method: Method,
        config: &EqualizerConfig,
    ) -> Result<Equalization, CrackContrastError> {
        crate::enhance(method, &self.image, config)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode a grayscale image as PNG bytes.
    pub fn gray_to_png_bytes(gray: &GrayImage) -> Result<Vec<u8>, CrackContrastError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        gray.write_to(&mut cursor, ImageFormat::Png).map_err(|err| {
            CrackContrastError::ImageError(format!("image encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    /// Write a grayscale image to a file. The format is inferred from the
    /// file extension.
    pub fn save_gray(
        gray: &GrayImage,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), CrackContrastError> {
        gray.save(path.as_ref()).map_err(|err| {
            CrackContrastError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}
