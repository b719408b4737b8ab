// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flachwerk — dewarp a photographed book page using two laser scans.
//
// Entry point. Initialises logging, resolves the configuration from an
// optional JSON file plus command-line overrides, and runs the dewarper.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flachwerk_core::error::{FlachwerkError, Result};
use flachwerk_core::human_errors::humanize_error;
use flachwerk_core::{DewarpConfig, FrameMode, PageSide};
use flachwerk_dewarp::{DewarpReport, Dewarper};

/// Dewarp images based on laser measurements taken during scanning.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// An image of a document to dewarp.
    #[arg(long = "image", default_value = "image.jpg")]
    image_path: PathBuf,

    /// A picture with lasers on and lights out taken of the same page as the image.
    #[arg(long = "laser", default_value = "laser.jpg")]
    laser_path: PathBuf,

    /// Destination path for the dewarped image.
    #[arg(long = "output", default_value = "output.png")]
    output_path: PathBuf,

    /// Optional JSON configuration file. Flags given on the command line win.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which side of the spine the page is on: "odd" (or "right") or "even" (or "left").
    #[arg(long = "page")]
    side: Option<String>,

    /// "single" if the camera is centred on one page, "double" if it is centred on the spine.
    #[arg(long)]
    frame: Option<String>,

    /// Threshold (0-255) for laser light. Higher values count less reflected light.
    #[arg(long)]
    laser_threshold: Option<u8>,

    /// Multiplier applied to the laser curve to estimate page height, normally 1.0 to 5.0.
    /// Too low foreshortens text near the spine; too high elongates it.
    #[arg(long)]
    height_factor: Option<f64>,

    /// Print a JSON report of landmarks and output size to stdout.
    #[arg(long)]
    report: bool,
}

impl Args {
    /// Start from the config file (or defaults) and apply command-line overrides.
    fn resolve_config(&self) -> Result<DewarpConfig> {
        let mut config = match &self.config {
            Some(path) => DewarpConfig::from_json_file(path)?,
            None => DewarpConfig::default(),
        };
        if let Some(side) = &self.side {
            config.page_side = side.parse::<PageSide>()?;
        }
        if let Some(frame) = &self.frame {
            config.frame = frame.parse::<FrameMode>()?;
        }
        if let Some(threshold) = self.laser_threshold {
            config.laser_threshold = threshold;
        }
        if let Some(factor) = self.height_factor {
            config.height_factor = factor;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<DewarpReport> {
    let config = args.resolve_config()?;
    tracing::debug!(?config, "Configuration resolved");
    Dewarper::new(config)?.dewarp_files(&args.image_path, &args.laser_path, &args.output_path)
}

/// Exit status for a run that stopped because of the configuration or an
/// unreadable file.
const EXIT_FATAL: u8 = 1;
/// Exit status for a run that stopped because the page geometry collapsed.
const EXIT_DEGRADED: u8 = 2;

/// Log a failed run and pick the process exit status from how it failed.
fn report_failure(err: &FlachwerkError) -> u8 {
    let human = humanize_error(err);
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
    if err.is_fatal() {
        tracing::error!(error = %err, "Dewarp failed");
        EXIT_FATAL
    } else {
        tracing::warn!(error = %err, "Dewarp stopped on unusable page geometry");
        EXIT_DEGRADED
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(report) => {
            for landmark in &report.landmarks.defaulted {
                tracing::warn!(%landmark, "Landmark was not detected; a default column was used");
            }
            if args.report {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => tracing::error!(error = %err, "Could not serialise report"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => ExitCode::from(report_failure(&err)),
    }
}
