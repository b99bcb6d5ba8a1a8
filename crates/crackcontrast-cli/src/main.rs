// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// crackcontrast: region-aware contrast enhancement for crack images.
//
// Entry point. Initialises logging, resolves the equalizer configuration and
// dispatches to the enhance / batch / score commands.

mod services;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use crackcontrast_core::human_errors::{Severity, humanize_error};
use crackcontrast_core::{CrackContrastError, EqualizerConfig, HistogramMasking, Method};
use crackcontrast_enhance::{ContrastMetric, ImageProcessor, LaplacianVariance};

use services::batch::{BatchJob, process_image, run_batch};
use services::report::RunReport;

#[derive(Parser)]
#[command(name = "crackcontrast")]
#[command(about = "Region-aware tanh histogram equalization for crack images")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a single image
    Enhance {
        /// Image to enhance (JPEG or PNG)
        input: PathBuf,

        /// Where to write the enhanced image (format from the extension)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Enhance every JPEG/PNG image in a directory
    Batch {
        /// Directory containing the images
        input_dir: PathBuf,

        /// Results go to OUTPUT_DIR/<method>/
        output_dir: PathBuf,

        /// Images processed concurrently [default: available parallelism]
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the Laplacian-variance contrast score of an image
    Score {
        /// Image to score
        input: PathBuf,
    },
}

/// Algorithm selection and equalizer overrides shared by the enhancing
/// commands.
#[derive(Args, Debug)]
struct TuningArgs {
    /// Equalization method: tanh or linear
    #[arg(short, long, default_value = "tanh", value_parser = parse_method)]
    method: Method,

    /// JSON file with equalizer settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Binarization threshold for dominant-region detection
    #[arg(long)]
    threshold: Option<u8>,

    /// Area fraction above which a bright blob is excluded
    #[arg(long)]
    exclusion_ratio: Option<f64>,

    /// Gaussian sigma for histogram smoothing
    #[arg(long)]
    sigma: Option<f64>,

    /// Leave masked-out pixels out of the region histograms entirely
    #[arg(long)]
    region_only: bool,

    /// Write a JSON report with scores, histograms and diagnostics
    #[arg(long)]
    report: Option<PathBuf>,
}

impl TuningArgs {
    /// Defaults, then the config file, then individual flags.
    fn equalizer_config(&self) -> Result<EqualizerConfig, CrackContrastError> {
        let mut config = match &self.config {
            Some(path) => EqualizerConfig::load(path)?,
            None => EqualizerConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config.binary_threshold = threshold;
        }
        if let Some(ratio) = self.exclusion_ratio {
            config.exclusion_area_ratio = ratio;
        }
        if let Some(sigma) = self.sigma {
            config.smoothing_sigma = sigma;
        }
        if self.region_only {
            config.histogram_masking = HistogramMasking::RegionOnly;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_method(raw: &str) -> Result<Method, String> {
    raw.parse::<Method>()
        .map_err(|err| humanize_error(&err).to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Enhance {
            input,
            output,
            tuning,
        } => enhance_one(&input, &output, &tuning).await,
        Commands::Batch {
            input_dir,
            output_dir,
            jobs,
            tuning,
        } => enhance_dir(input_dir, output_dir, jobs, &tuning).await,
        Commands::Score { input } => score_one(&input),
    }
}

async fn enhance_one(input: &Path, output: &Path, tuning: &TuningArgs) -> anyhow::Result<()> {
    let config = tuning.equalizer_config().map_err(explain)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let (source, target) = (input.to_path_buf(), output.to_path_buf());
    let (method, job_config) = (tuning.method, config.clone());
    let job = move || process_image(&source, &target, method, &job_config);
    let image = tokio::task::spawn_blocking(job).await?.map_err(explain)?;

    println!(
        "{}: contrast {:.2} -> {:.2}, saved to {}",
        image.source.display(),
        image.contrast_before,
        image.contrast_after,
        image.output.display()
    );

    if let Some(path) = &tuning.report {
        let mut report = RunReport::new(tuning.method, config);
        report.images.push(image);
        write_report(&report, path)?;
    }
    Ok(())
}

async fn enhance_dir(
    input_dir: PathBuf,
    output_dir: PathBuf,
    jobs: Option<usize>,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let config = tuning.equalizer_config().map_err(explain)?;
    let jobs = jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    if jobs == 0 {
        bail!("--jobs must be at least 1");
    }

    let job = BatchJob {
        input_dir,
        output_dir,
        method: tuning.method,
        config,
        jobs,
    };
    let report = run_batch(&job).await.map_err(explain)?;

    for image in &report.images {
        println!(
            "{}: contrast {:.2} -> {:.2}",
            image.source.display(),
            image.contrast_before,
            image.contrast_after
        );
    }
    for failure in &report.failures {
        let outcome = match failure.severity {
            Severity::Permanent => "cannot be enhanced",
            Severity::ActionRequired => "skipped",
        };
        eprintln!(
            "{} {outcome}: {} {}",
            failure.source.display(),
            failure.error,
            failure.suggestion
        );
    }
    println!(
        "{} of {} images enhanced into {}",
        report.images.len(),
        report.images.len() + report.failures.len(),
        job.method_dir().display()
    );

    if let Some(path) = &tuning.report {
        write_report(&report, path)?;
    }
    Ok(())
}

fn score_one(input: &Path) -> anyhow::Result<()> {
    let gray = ImageProcessor::open(input).map_err(explain)?.to_gray();
    let score = LaplacianVariance.score(&gray).map_err(explain)?;
    println!("{}: {score:.4}", input.display());
    Ok(())
}

fn write_report(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    report.write_json(path).map_err(explain)?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

/// Attach the plain-English explanation to a backend error.
fn explain(err: CrackContrastError) -> anyhow::Error {
    let human = humanize_error(&err);
    anyhow::Error::new(err).context(human.to_string())
}
