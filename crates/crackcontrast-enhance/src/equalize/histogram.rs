// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Histogram estimation: per-region intensity histograms, Gaussian smoothing,
// and dominant peak extraction.

use crackcontrast_core::error::Result;
use crackcontrast_core::{Histogram, HistogramMasking, Peak, PeakSource};
use image::GrayImage;
use tracing::{debug, instrument};

use super::segment::ExclusionMask;

/// Kernel half-width in standard deviations.
const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// A histogram after Gaussian smoothing: 256 non-negative real values.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedHistogram {
    values: Vec<f64>,
}

impl SmoothedHistogram {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Histograms and peaks of the included and excluded regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEstimate {
    /// Unsmoothed histogram of the included partition.
    pub included_histogram: Histogram,
    /// Unsmoothed histogram of the excluded partition.
    pub excluded_histogram: Histogram,
    pub included_peak: Peak,
    pub excluded_peak: Peak,
    /// Pixels outside every excluded region.
    pub included_pixels: u64,
    /// Pixels inside an excluded region.
    pub excluded_pixels: u64,
    pub masking: HistogramMasking,
}

impl RegionEstimate {
    /// Pixels counted by both histograms, minus the sentinel fill added under
    /// [`HistogramMasking::SentinelZero`]. Always equals the image area.
    pub fn region_pixel_total(&self) -> u64 {
        let sentinel_fill = match self.masking {
            // Each histogram received one bin-0 sample per pixel of the
            // other region.
            HistogramMasking::SentinelZero => self.included_pixels + self.excluded_pixels,
            HistogramMasking::RegionOnly => 0,
        };
        self.included_histogram.total() + self.excluded_histogram.total() - sentinel_fill
    }
}

/// Split `gray` into its included and excluded partitions and histogram each.
///
/// Under [`HistogramMasking::SentinelZero`] a pixel of one region is recorded
/// as intensity 0 in the other region's histogram, so bin 0 of each histogram
/// is inflated by the other region's pixel count. Genuine intensity-0 pixels
/// are indistinguishable from that fill.
///
/// Fails with `InvalidInput` when `mask` does not cover `gray`.
pub fn partition_histograms(
    gray: &GrayImage,
    mask: &ExclusionMask,
    masking: HistogramMasking,
) -> Result<(Histogram, Histogram)> {
    mask.ensure_covers(gray)?;
    let mut included = Histogram::new();
    let mut excluded = Histogram::new();

    for (pixel, &is_excluded) in gray.pixels().zip(mask.as_slice()) {
        let value = pixel.0[0];
        let (own, other) = if is_excluded {
            (&mut excluded, &mut included)
        } else {
            (&mut included, &mut excluded)
        };
        own.record(value);
        if masking == HistogramMasking::SentinelZero {
            other.record(0);
        }
    }

    Ok((included, excluded))
}

/// Smooth `histogram` with a Gaussian kernel of standard deviation `sigma`
/// bins.
///
/// The kernel is truncated at four standard deviations and the histogram is
/// extended past both ends by half-sample symmetric reflection
/// (`... c b a | a b c ... x y z | z y x ...`). `sigma == 0` returns the
/// counts unchanged.
pub fn smooth_histogram(histogram: &Histogram, sigma: f64) -> SmoothedHistogram {
    let counts: Vec<f64> = histogram.bins().iter().map(|&c| c as f64).collect();
    if sigma <= 0.0 {
        return SmoothedHistogram { values: counts };
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let len = counts.len() as isize;

    let values = (0..len)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let source = reflect_index(i + k as isize - radius, len);
                    weight * counts[source]
                })
                .sum::<f64>()
        })
        .collect();

    SmoothedHistogram { values }
}

/// Normalised, symmetric Gaussian weights of length `2 * radius + 1`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|offset| (-0.5 * (offset as f64 / sigma).powi(2)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Fold an out-of-range index back into `0..len` by half-sample reflection.
fn reflect_index(index: isize, len: isize) -> usize {
    let period = 2 * len;
    let folded = index.rem_euclid(period);
    if folded < len {
        folded as usize
    } else {
        (period - 1 - folded) as usize
    }
}

/// Interior local maxima of `values`.
///
/// A bin is a local maximum when its left neighbour is strictly lower and the
/// first differing value to its right is also strictly lower. Flat plateaus
/// report their middle bin (rounded down). The first and last bins are never
/// local maxima.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Pick the most prominent bin of `smoothed`.
///
/// The tallest local maximum wins; when the histogram has none (flat or
/// monotonic) the global maximum is used. Ties go to the lowest bin.
pub fn dominant_peak(smoothed: &SmoothedHistogram) -> Peak {
    let values = smoothed.values();
    match tallest_of(values, local_maxima(values)) {
        Some(bin) => Peak {
            bin: bin as u8,
            source: PeakSource::LocalMaximum,
        },
        None => Peak {
            bin: tallest_of(values, 0..values.len()).unwrap_or(0) as u8,
            source: PeakSource::GlobalArgmax,
        },
    }
}

/// Index among `candidates` with the largest value (first wins on ties).
fn tallest_of(values: &[f64], candidates: impl IntoIterator<Item = usize>) -> Option<usize> {
    candidates
        .into_iter()
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if values[b] >= values[i] => Some(b),
            _ => Some(i),
        })
}

/// Run the whole histogram estimation stage.
#[instrument(skip(gray, mask))]
pub fn estimate_regions(
    gray: &GrayImage,
    mask: &ExclusionMask,
    masking: HistogramMasking,
    sigma: f64,
) -> Result<RegionEstimate> {
    let (included_histogram, excluded_histogram) = partition_histograms(gray, mask, masking)?;

    let included_peak = dominant_peak(&smooth_histogram(&included_histogram, sigma));
    let excluded_peak = dominant_peak(&smooth_histogram(&excluded_histogram, sigma));

    let estimate = RegionEstimate {
        included_histogram,
        excluded_histogram,
        included_peak,
        excluded_peak,
        included_pixels: mask.included_count(),
        excluded_pixels: mask.excluded_count(),
        masking,
    };
    debug!(
        included_peak = included_peak.bin,
        included_source = ?included_peak.source,
        excluded_peak = excluded_peak.bin,
        excluded_source = ?excluded_peak.source,
        region_pixels = estimate.region_pixel_total(),
        "Region peaks estimated"
    );

    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equalize::segment::exclusion_mask;
    use crackcontrast_core::CrackContrastError;
    use image::Luma;

    fn histogram_with(entries: &[(u8, u64)]) -> Histogram {
        let mut histogram = Histogram::new();
        for &(bin, count) in entries {
            for _ in 0..count {
                histogram.record(bin);
            }
        }
        histogram
    }

    #[test]
    fn reflect_index_mirrors_both_edges() {
        assert_eq!(reflect_index(-1, 256), 0);
        assert_eq!(reflect_index(-3, 256), 2);
        assert_eq!(reflect_index(256, 256), 255);
        assert_eq!(reflect_index(258, 256), 253);
        assert_eq!(reflect_index(17, 256), 17);
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 17);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for k in 0..kernel.len() / 2 {
            assert!((kernel[k] - kernel[kernel.len() - 1 - k]).abs() < 1e-15);
        }
        assert!(kernel[8] > kernel[7]);
    }

    /// Reflection keeps all mass inside the 256 bins.
    #[test]
    fn smoothing_preserves_mass() {
        let histogram = histogram_with(&[(0, 500), (3, 40), (128, 300), (255, 7)]);
        let smoothed = smooth_histogram(&histogram, 2.0);
        let mass: f64 = smoothed.values().iter().sum();
        assert!((mass - 847.0).abs() < 1e-9, "mass {mass}");
        assert!(smoothed.values().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn zero_sigma_is_identity() {
        let histogram = histogram_with(&[(10, 3), (11, 1)]);
        let smoothed = smooth_histogram(&histogram, 0.0);
        assert_eq!(smoothed.values()[10], 3.0);
        assert_eq!(smoothed.values()[11], 1.0);
    }

    #[test]
    fn local_maxima_finds_interior_peaks_only() {
        let values = [5.0, 1.0, 3.0, 1.0, 2.0, 4.0];
        assert_eq!(local_maxima(&values), vec![2]);
    }

    #[test]
    fn local_maxima_reports_plateau_middle() {
        let values = [0.0, 1.0, 2.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(local_maxima(&values), vec![3]);
    }

    /// A plateau running into the last bin is not a peak.
    #[test]
    fn plateau_touching_edge_is_not_a_peak() {
        let values = [0.0, 1.0, 2.0, 2.0];
        assert!(local_maxima(&values).is_empty());
    }

    #[test]
    fn dominant_peak_prefers_tallest_local_maximum() {
        let histogram = histogram_with(&[(40, 50), (180, 120)]);
        let peak = dominant_peak(&smooth_histogram(&histogram, 2.0));
        assert_eq!(peak.bin, 180);
        assert_eq!(peak.source, PeakSource::LocalMaximum);
    }

    /// Mass piled at bin 0 is monotonically decreasing after smoothing, so
    /// there is no local maximum and the global argmax is used.
    #[test]
    fn monotonic_histogram_falls_back_to_argmax() {
        let histogram = histogram_with(&[(0, 100)]);
        let peak = dominant_peak(&smooth_histogram(&histogram, 2.0));
        assert_eq!(peak.bin, 0);
        assert_eq!(peak.source, PeakSource::GlobalArgmax);
    }

    #[test]
    fn empty_histogram_falls_back_to_bin_zero() {
        let peak = dominant_peak(&smooth_histogram(&Histogram::new(), 2.0));
        assert_eq!(peak.bin, 0);
        assert_eq!(peak.source, PeakSource::GlobalArgmax);
    }

    #[test]
    fn top_bin_is_found_through_fallback() {
        let histogram = histogram_with(&[(255, 10)]);
        let peak = dominant_peak(&smooth_histogram(&histogram, 2.0));
        assert_eq!(peak.bin, 255);
        assert_eq!(peak.source, PeakSource::GlobalArgmax);
    }

    /// Sentinel fill adds the other region's pixel count to bin 0.
    #[test]
    fn sentinel_zero_inflates_bin_zero() {
        let gray = GrayImage::from_raw(4, 1, vec![10, 20, 200, 210]).unwrap();
        let mask = exclusion_mask(&gray, 150, 0.2);
        assert_eq!(mask.excluded_count(), 2);

        let masking = HistogramMasking::SentinelZero;
        let (included, excluded) = partition_histograms(&gray, &mask, masking).unwrap();
        assert_eq!(included.count(0), 2);
        assert_eq!(included.count(10), 1);
        assert_eq!(excluded.count(0), 2);
        assert_eq!(excluded.count(210), 1);
        assert_eq!(included.total(), 4);
        assert_eq!(excluded.total(), 4);
    }

    #[test]
    fn region_only_counts_each_pixel_once() {
        let gray = GrayImage::from_raw(4, 1, vec![10, 20, 200, 210]).unwrap();
        let mask = exclusion_mask(&gray, 150, 0.2);
        let masking = HistogramMasking::RegionOnly;
        let (included, excluded) = partition_histograms(&gray, &mask, masking).unwrap();
        assert_eq!(included.count(0), 0);
        assert_eq!(included.total(), 2);
        assert_eq!(excluded.total(), 2);
        assert_eq!(included.total() + excluded.total(), 4);
    }

    /// Region pixel counts add up to the image area under both policies.
    #[test]
    fn histogram_conservation() {
        let mut gray = GrayImage::from_pixel(30, 20, Luma([60u8]));
        for y in 0..20 {
            for x in 0..12 {
                gray.put_pixel(x, y, Luma([190u8]));
            }
        }
        let mask = exclusion_mask(&gray, 150, 0.2);
        assert_eq!(mask.excluded_count(), 240);

        for masking in [HistogramMasking::SentinelZero, HistogramMasking::RegionOnly] {
            let estimate = estimate_regions(&gray, &mask, masking, 2.0).unwrap();
            assert_eq!(estimate.region_pixel_total(), 600);
        }
        let masking = HistogramMasking::RegionOnly;
        let region_only = estimate_regions(&gray, &mask, masking, 2.0).unwrap();
        assert_eq!(
            region_only.included_histogram.total() + region_only.excluded_histogram.total(),
            600
        );
    }

    /// A mask built for a different image size is rejected instead of
    /// silently undercounting.
    #[test]
    fn mismatched_mask_is_invalid_input() {
        let gray = GrayImage::from_pixel(4, 4, Luma([120u8]));
        let mask = exclusion_mask(&GrayImage::new(2, 2), 150, 0.2);

        for masking in [HistogramMasking::SentinelZero, HistogramMasking::RegionOnly] {
            let err = partition_histograms(&gray, &mask, masking).unwrap_err();
            assert!(matches!(err, CrackContrastError::InvalidInput(_)));

            let estimate = estimate_regions(&gray, &mask, masking, 2.0);
            assert!(matches!(estimate, Err(CrackContrastError::InvalidInput(_))));
        }
    }
}
