// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch enhancement: every JPEG/PNG in a directory is enhanced on the
// blocking pool and written to `<output>/<method>/<file name>`.
//
// Images are independent, so they run concurrently. At most `jobs` images
// are decoded at any one time.

use std::path::{Path, PathBuf};

use crackcontrast_core::error::{CrackContrastError, Result};
use crackcontrast_core::{EqualizerConfig, Method};
use crackcontrast_enhance::{ContrastMetric, ImageProcessor, LaplacianVariance};
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::report::{FailedImage, ImageReport, RunReport};

/// File extensions picked up by a batch run (compared case-insensitively).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// One batch run over a directory.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub method: Method,
    pub config: EqualizerConfig,
    /// Maximum number of images in flight.
    pub jobs: usize,
}

impl BatchJob {
    /// Directory the enhanced images land in.
    pub fn method_dir(&self) -> PathBuf {
        self.output_dir.join(self.method.as_str())
    }
}

/// List the enhanceable images directly inside `dir`, sorted by path.
pub async fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !has_image_extension(&path) {
            continue;
        }
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Enhance a single image file, write the result to `output`, and score
/// both sides.
#[instrument(skip_all, fields(source = %source.display(), %method))]
pub fn process_image(
    source: &Path,
    output: &Path,
    method: Method,
    config: &EqualizerConfig,
) -> Result<ImageReport> {
    let processor = ImageProcessor::open(source)?;
    let result = processor.enhance(method, config)?;
    ImageProcessor::save_gray(&result.equalized, output)?;

    let metric = LaplacianVariance;
    let contrast_before = metric.score(&result.gray)?;
    let contrast_after = metric.score(&result.equalized)?;
    info!(
        contrast_before,
        contrast_after,
        output = %output.display(),
        "Image enhanced"
    );

    Ok(ImageReport {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: processor.width(),
        height: processor.height(),
        contrast_before,
        contrast_after,
        original_histogram: result.original_histogram,
        equalized_histogram: result.equalized_histogram,
        diagnostics: result.diagnostics,
    })
}

/// Run `job`, collecting per-image reports and failures.
///
/// A failure on one image is recorded and does not stop the others. Only
/// problems with the directories themselves abort the run.
#[instrument(skip_all, fields(input = %job.input_dir.display(), method = %job.method))]
pub async fn run_batch(job: &BatchJob) -> Result<RunReport> {
    let images = collect_images(&job.input_dir).await?;
    let method_dir = job.method_dir();
    tokio::fs::create_dir_all(&method_dir).await?;

    if images.is_empty() {
        warn!("No JPEG or PNG images found");
    }
    info!(count = images.len(), jobs = job.jobs, "Starting batch");

    let limit = job.jobs.max(1);
    let mut pending = JoinSet::new();
    let mut outcomes = Vec::with_capacity(images.len());

    for (index, source) in images.into_iter().enumerate() {
        while pending.len() >= limit {
            if let Some(joined) = pending.join_next().await {
                outcomes.push(joined.map_err(join_failure)?);
            }
        }

        let Some(file_name) = source.file_name() else {
            continue;
        };
        let output = method_dir.join(file_name);
        let method = job.method;
        let config = job.config.clone();
        pending.spawn_blocking(move || {
            let outcome = process_image(&source, &output, method, &config);
            (index, source, outcome)
        });
    }
    while let Some(joined) = pending.join_next().await {
        outcomes.push(joined.map_err(join_failure)?);
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut report = RunReport::new(job.method, job.config.clone());
    for (_, source, outcome) in outcomes {
        match outcome {
            Ok(image) => report.images.push(image),
            Err(err) => {
                warn!(source = %source.display(), "Image skipped: {err}");
                report.failures.push(FailedImage::new(source, &err));
            }
        }
    }

    info!(
        enhanced = report.images.len(),
        failed = report.failures.len(),
        "Batch complete"
    );
    Ok(report)
}

fn join_failure(err: tokio::task::JoinError) -> CrackContrastError {
    CrackContrastError::Io(std::io::Error::other(format!(
        "enhancement task did not finish: {err}"
    )))
}
