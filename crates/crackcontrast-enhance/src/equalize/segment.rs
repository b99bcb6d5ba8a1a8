// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region segmentation: binarize, label 8-connected bright blobs, and mark
// every blob larger than the exclusion limit as "excluded".

use crackcontrast_core::error::{CrackContrastError, Result};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use tracing::{debug, instrument};

/// Per-pixel flag marking pixels that belong to a dominant blob.
///
/// Excluded pixels keep their original intensity through remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionMask {
    width: u32,
    height: u32,
    /// Row-major, `width * height` entries.
    excluded: Vec<bool>,
}

impl ExclusionMask {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fail with `InvalidInput` unless the mask covers exactly the pixels of
    /// `gray`.
    pub fn ensure_covers(&self, gray: &GrayImage) -> Result<()> {
        if (self.width(), self.height()) != gray.dimensions() {
            return Err(CrackContrastError::InvalidInput(format!(
                "exclusion mask is {}x{} but the image is {}x{}",
                self.width(),
                self.height(),
                gray.width(),
                gray.height()
            )));
        }
        Ok(())
    }

    /// Whether the pixel at `(x, y)` belongs to an excluded region.
    pub fn is_excluded(&self, x: u32, y: u32) -> bool {
        self.excluded[y as usize * self.width as usize + x as usize]
    }

    /// Row-major view of the flags, matching `GrayImage::pixels()` order.
    pub fn as_slice(&self) -> &[bool] {
        &self.excluded
    }

    pub fn excluded_count(&self) -> u64 {
        self.excluded.iter().filter(|&&flag| flag).count() as u64
    }

    pub fn included_count(&self) -> u64 {
        self.excluded.len() as u64 - self.excluded_count()
    }

    /// Fraction of pixels outside every excluded region, in [0, 1].
    ///
    /// An empty mask reports 1.0.
    pub fn included_ratio(&self) -> f64 {
        if self.excluded.is_empty() {
            return 1.0;
        }
        self.included_count() as f64 / self.excluded.len() as f64
    }
}

/// Map every pixel `>= threshold` to 255 and every other pixel to 0.
///
/// A pixel equal to `threshold` counts as bright. OpenCV's `THRESH_BINARY`
/// uses a strict `>`, so results differ from it only for pixels of exactly
/// `threshold`.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if gray.get_pixel(x, y).0[0] >= threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Pixel count of every label in `labels`, indexed by label.
///
/// Index 0 holds the background (unlabelled) count.
pub fn region_areas(labels: &ImageBuffer<Luma<u32>, Vec<u32>>) -> Vec<u64> {
    let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    let mut areas = vec![0u64; max_label as usize + 1];
    for pixel in labels.pixels() {
        areas[pixel.0[0] as usize] += 1;
    }
    areas
}

/// Build the exclusion mask of `gray`.
///
/// Bright pixels (`>= binary_threshold`) are grouped into 8-connected blobs.
/// Any blob whose area exceeds `exclusion_area_ratio * width * height` is
/// excluded. Dark pixels form the background label and are never excluded.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn exclusion_mask(
    gray: &GrayImage,
    binary_threshold: u8,
    exclusion_area_ratio: f64,
) -> ExclusionMask {
    let (width, height) = gray.dimensions();
    let binary = binarize(gray, binary_threshold);
    let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));
    let areas = region_areas(&labels);

    let total_area = width as f64 * height as f64;
    let area_limit = exclusion_area_ratio * total_area;
    let dominant_label: Vec<bool> = areas
        .iter()
        .enumerate()
        .map(|(label, &area)| label != 0 && area as f64 > area_limit)
        .collect();

    debug!(
        components = areas.len().saturating_sub(1),
        dominant = dominant_label.iter().filter(|&&d| d).count(),
        area_limit,
        "Connected components classified"
    );

    ExclusionMask {
        width,
        height,
        excluded: labels
            .pixels()
            .map(|p| dominant_label[p.0[0] as usize])
            .collect(),
    }
}
