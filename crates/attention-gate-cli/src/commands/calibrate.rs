//! Calibrate command - guided pose capture that writes the thresholds file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use attention_gate_adapters::JsonThresholdStore;
use attention_gate_core::{CaptureGuard, Calibrator};
use clap::Args;
use tracing::info;

use super::{is_abort, landmark_capture, ExitCode};
use crate::config::AppConfig;
use crate::output::TerminalPrompt;

/// Arguments for `calibrate`.
#[derive(Args, Clone)]
pub struct CalibrateArgs {
    /// JSON-lines landmark recording to read poses from
    #[arg(long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Where to write the thresholds (overrides thresholds.file)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Run the calibrate command.
pub fn run(args: &CalibrateArgs, config: &AppConfig) -> Result<ExitCode> {
    let capture = landmark_capture(args.landmarks.as_ref(), config)?;
    let store = JsonThresholdStore::new(
        args.output
            .clone()
            .unwrap_or_else(|| config.thresholds_file()),
    );
    info!("Calibrating into {}", store.path().display());

    let mut stream =
        CaptureGuard::open(capture.as_ref()).context("Failed to open landmark source")?;
    let mut prompt = TerminalPrompt::stdio();
    let calibrator = Calibrator::new(config.calibration());

    match calibrator.calibrate(&mut *stream, &store, &mut prompt) {
        Ok(_) => {
            eprintln!("Thresholds written to {}", store.path().display());
            Ok(ExitCode::Success)
        }
        Err(e) if is_abort(&e) => {
            eprintln!("Calibration aborted; existing thresholds left unchanged");
            Ok(ExitCode::Aborted)
        }
        Err(e) => Err(e),
    }
}
