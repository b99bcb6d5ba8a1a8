// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the crackcontrast-enhance crate. Covers the full
// tanh equalizer and its segmentation stage on a synthetic crack image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};

use crackcontrast_core::EqualizerConfig;
use crackcontrast_enhance::equalize::exclusion_mask;
use crackcontrast_enhance::equalize_gray;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 512x512 synthetic "concrete" image: a bright textured background covering
/// most of the frame and a dark diagonal crack two pixels wide.
fn synthetic_crack() -> GrayImage {
    let (width, height) = (512u32, 512u32);
    let mut img = GrayImage::from_fn(width, height, |x, y| {
        Luma([(170 + (x * 7 + y * 13) % 40) as u8])
    });
    for i in 0..width {
        for offset in 0..2 {
            let y = (i / 2 + offset).min(height - 1);
            img.put_pixel(i, y, Luma([40u8]));
        }
    }
    img
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_tanh_equalize(c: &mut Criterion) {
    let img = synthetic_crack();
    let config = EqualizerConfig::default();

    c.bench_function("tanh_equalize (512x512)", |b| {
        b.iter(|| {
            let result = equalize_gray(black_box(&img), &config).expect("valid image");
            black_box(result.equalized);
        });
    });
}

fn bench_segmentation(c: &mut Criterion) {
    let img = synthetic_crack();
    let config = EqualizerConfig::default();

    c.bench_function("exclusion_mask (512x512)", |b| {
        b.iter(|| {
            let mask = exclusion_mask(
                black_box(&img),
                config.binary_threshold,
                config.exclusion_area_ratio,
            );
            black_box(mask.excluded_count());
        });
    });
}

criterion_group!(benches, bench_tanh_equalize, bench_segmentation);
criterion_main!(benches);
