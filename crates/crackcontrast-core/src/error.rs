// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for crackcontrast.

use thiserror::Error;

/// Top-level error type for all crackcontrast operations.
#[derive(Debug, Error)]
pub enum CrackContrastError {
    // -- Algorithm errors --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    // -- Codec errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CrackContrastError>;
