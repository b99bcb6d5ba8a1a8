// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Peak fusion: blend the included and excluded peaks into the centre of the
// tanh curve.

use tracing::debug;

/// Smallest reference peak; keeps `x / p` finite in the tone curve.
pub const MIN_REFERENCE_PEAK: f64 = 1.0;

/// Centre of the tanh tone curve, always `>= MIN_REFERENCE_PEAK`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ReferencePeak(f64);

impl ReferencePeak {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Area-weighted blend of the two region peaks.
///
/// `included_ratio` is the fraction of pixels outside every excluded region
/// and is clamped to [0, 1]: 1 yields the included peak, 0 the excluded peak.
pub fn fuse_peaks(included_peak: u8, excluded_peak: u8, included_ratio: f64) -> ReferencePeak {
    let r = included_ratio.clamp(0.0, 1.0);
    let blended = included_peak as f64 * r + excluded_peak as f64 * (1.0 - r);
    let reference = blended.max(MIN_REFERENCE_PEAK);
    debug!(included_peak, excluded_peak, r, reference, "Peaks fused");
    ReferencePeak(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_included_uses_included_peak() {
        assert_eq!(fuse_peaks(100, 220, 1.0).value(), 100.0);
    }

    #[test]
    fn fully_excluded_uses_excluded_peak() {
        assert_eq!(fuse_peaks(0, 200, 0.0).value(), 200.0);
    }

    #[test]
    fn blend_is_area_weighted() {
        let p = fuse_peaks(50, 200, 0.75);
        assert!((p.value() - 87.5).abs() < 1e-12);
    }

    /// A fully black image would otherwise give a zero denominator.
    #[test]
    fn zero_peaks_are_floored() {
        assert_eq!(fuse_peaks(0, 0, 0.4).value(), MIN_REFERENCE_PEAK);
    }
}
