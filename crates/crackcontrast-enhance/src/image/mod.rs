// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decode from disk or memory, grayscale conversion, encode.

pub mod processor;

pub use processor::ImageProcessor;
