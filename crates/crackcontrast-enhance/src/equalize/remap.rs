// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tanh remapping: build the peak-relative tone curve and apply it to the
// included pixels.

use crackcontrast_core::error::Result;
use image::GrayImage;
use tracing::{debug, instrument};

use super::fusion::ReferencePeak;
use super::segment::ExclusionMask;

/// 256-entry lookup table: index = input intensity, value = mapped intensity
/// before clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCurve {
    table: [f32; 256],
}

impl ToneCurve {
    /// Peak-relative tanh curve centred on `peak`.
    ///
    /// Intensities above the peak are expanded by `0.5 * tanh(x/p) * x`,
    /// intensities at or below it are compressed by the same amount.
    pub fn tanh(peak: ReferencePeak) -> Self {
        let p = peak.value();
        let mut table = [0f32; 256];
        for (x, entry) in table.iter_mut().enumerate() {
            let x = x as f64;
            let correction = 0.5 * (x / p).tanh() * x;
            let mapped = if x > p { x + correction } else { x - correction };
            *entry = mapped as f32;
        }
        Self { table }
    }

    /// Mapped value of intensity `x`.
    pub fn map(&self, x: u8) -> f32 {
        self.table[x as usize]
    }
}

/// Map every included pixel of `gray` through `curve`.
///
/// Excluded pixels keep their original intensity. Results are clipped to the
/// input's own `[min, max]` range and truncated to `u8`. Fails with
/// `InvalidInput` when `mask` does not cover `gray`.
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn apply_tone_curve(
    gray: &GrayImage,
    mask: &ExclusionMask,
    curve: &ToneCurve,
) -> Result<GrayImage> {
    mask.ensure_covers(gray)?;
    let (low, high) = intensity_range(gray);
    debug!(low, high, "Clip range");

    let mut remapped = gray.clone();
    for (x, y, pixel) in remapped.enumerate_pixels_mut() {
        if mask.is_excluded(x, y) {
            continue;
        }
        let mapped = curve.map(pixel.0[0]).clamp(low as f32, high as f32);
        pixel.0[0] = mapped as u8;
    }
    Ok(remapped)
}

/// Smallest and largest intensity of `gray`; `(0, 0)` when empty.
pub fn intensity_range(gray: &GrayImage) -> (u8, u8) {
    gray.pixels()
        .map(|p| p.0[0])
        .fold(None, |range: Option<(u8, u8)>, v| match range {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equalize::fusion::fuse_peaks;
    use crate::equalize::segment::exclusion_mask;
    use crackcontrast_core::CrackContrastError;
    use image::Luma;

    fn curve_at(peak: u8) -> ToneCurve {
        ToneCurve::tanh(fuse_peaks(peak, peak, 1.0))
    }

    #[test]
    fn curve_compresses_at_and_below_peak() {
        let curve = curve_at(100);
        let expected = 100.0 - 0.5 * 1f64.tanh() * 100.0;
        assert!((curve.map(100) as f64 - expected).abs() < 1e-3);
        assert!((curve.map(100) - 61.92).abs() < 0.01);
        assert_eq!(curve.map(0), 0.0);
    }

    #[test]
    fn curve_expands_above_peak() {
        let curve = curve_at(100);
        let expected = 200.0 + 0.5 * 2f64.tanh() * 200.0;
        assert!((curve.map(200) as f64 - expected).abs() < 1e-3);
        assert!(curve.map(200) > 296.0);
    }

    #[test]
    fn intensity_range_of_image() {
        let gray = GrayImage::from_raw(3, 1, vec![40, 7, 90]).unwrap();
        assert_eq!(intensity_range(&gray), (7, 90));
    }

    /// Output stays inside the input range and excluded pixels are untouched.
    #[test]
    fn apply_clips_and_passes_through_excluded() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 8 + y * 4 + 20) as u8]));
        let mut mask_source = gray.clone();
        // Make the bottom half bright enough to form one large blob.
        for y in 8..16 {
            for x in 0..16 {
                mask_source.put_pixel(x, y, Luma([255u8]));
            }
        }
        let mask = exclusion_mask(&mask_source, 150, 0.2);
        assert!(mask.excluded_count() >= 128);

        let out = apply_tone_curve(&gray, &mask, &curve_at(90)).unwrap();
        let (low, high) = intensity_range(&gray);
        for y in 0..16 {
            for x in 0..16 {
                let v = out.get_pixel(x, y).0[0];
                assert!(v >= low && v <= high);
                if mask.is_excluded(x, y) {
                    assert_eq!(v, gray.get_pixel(x, y).0[0]);
                }
            }
        }
    }

    /// A mask of the wrong size is an error, never a blank image.
    #[test]
    fn mismatched_mask_is_invalid_input() {
        let gray = GrayImage::from_pixel(4, 4, Luma([120u8]));
        let mask = exclusion_mask(&GrayImage::new(2, 2), 150, 0.2);

        let err = apply_tone_curve(&gray, &mask, &curve_at(120)).unwrap_err();
        assert!(matches!(err, CrackContrastError::InvalidInput(_)));
    }
}
