mod cli;
mod config;
mod report;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use diffimg::{DiffError, adapter};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diffimg=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Compare the two inputs and return the process exit code.
///
/// The diff image is written before the ratio is printed, so a run that
/// fails the gate still leaves it behind.
fn run(cli: cli::Cli) -> Result<u8> {
    let overrides = CliOverrides {
        config: cli.config,
        ignore_alpha: cli.ignore_alpha,
        alpha: cli.alpha,
        threshold: cli.threshold,
        ratio: cli.ratio,
        generate: cli.generate,
    };
    let config = ResolvedRunConfig::new(overrides)?;

    let (first, second) = adapter::load_pair(&cli.first, &cli.second)?;
    let result = diffimg::diff(&first, &second, &config.options)?;

    if let (Some(path), Some(diff_image)) = (&config.generate, &result.diff_image) {
        adapter::save_png(path, diff_image.image())?;
        report::print_saved(path);
    }

    info!(ratio = result.ratio, "compared");
    report::print_ratio(result.ratio, config.raw_ratio);

    if let Some(threshold) = config.threshold
        && exceeds_threshold(result.ratio, threshold)
    {
        report::print_threshold_exceeded(result.ratio, threshold);
        return Ok(1);
    }
    Ok(0)
}

/// A ratio equal to the threshold still passes.
fn exceeds_threshold(ratio: f64, threshold: f64) -> bool {
    ratio > threshold
}

/// 2 = input unusable, 3 = dimensions differ, 4 = diff image not written,
/// 1 = anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<DiffError>() {
        Some(
            DiffError::FileNotFound { .. }
            | DiffError::Read { .. }
            | DiffError::Decode { .. }
            | DiffError::DecodeBuffer(_),
        ) => 2,
        Some(DiffError::DimensionMismatch { .. }) => 3,
        Some(DiffError::Encode { .. } | DiffError::EncodeBuffer(_)) => 4,
        Some(DiffError::InvalidOptions(_)) | None => 1,
    }
}
