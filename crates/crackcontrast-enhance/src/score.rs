// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast scoring: a scalar quality measure reported before and after
// enhancement. Scores never influence the equalizer itself.

use crackcontrast_core::error::{CrackContrastError, Result};
use image::GrayImage;

/// A scalar contrast/sharpness metric over a grayscale image.
pub trait ContrastMetric {
    /// Score `gray`; higher means more local contrast.
    fn score(&self, gray: &GrayImage) -> Result<f64>;
}

/// Variance of the 3x3 Laplacian response `[0,1,0; 1,-4,1; 0,1,0]`.
///
/// Every pixel contributes; borders are extended by reflection without
/// repeating the edge pixel (`c b | a b c`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplacianVariance;

impl ContrastMetric for LaplacianVariance {
    fn score(&self, gray: &GrayImage) -> Result<f64> {
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Err(CrackContrastError::InvalidInput(format!(
                "cannot score an empty image ({w}x{h})"
            )));
        }

        let at = |x: i64, y: i64| -> f64 {
            let sx = reflect_101(x, w as i64);
            let sy = reflect_101(y, h as i64);
            gray.get_pixel(sx, sy).0[0] as f64
        };

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in 0..h as i64 {
            for x in 0..w as i64 {
                let laplacian =
                    at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * at(x, y);
                sum += laplacian;
                sum_sq += laplacian * laplacian;
            }
        }

        let count = (w as u64 * h as u64) as f64;
        let mean = sum / count;
        Ok((sum_sq / count - mean * mean).max(0.0))
    }
}

/// Reflect an index into `0..len` without duplicating the border sample.
fn reflect_101(index: i64, len: i64) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let folded = index.rem_euclid(period);
    (if folded < len { folded } else { period - folded }) as u32
}
