//! CLI command definitions and handlers.

pub mod calibrate;
pub mod console;
pub mod serve;
pub mod thresholds;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use attention_gate_adapters::ReplayCapture;
use attention_gate_core::AttentionError;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Attention Gate - play/pause signals from where you are looking
#[derive(Parser)]
#[command(name = "attention-gate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve attention signals over WebSocket until interrupted
    Serve(serve::ServeArgs),
    /// Derive personal thresholds through guided poses
    Calibrate(calibrate::CalibrateArgs),
    /// Interactive control loop (start, stop, calibrate, status, quit)
    Console(console::ConsoleArgs),
    /// Inspect the stored calibration
    Thresholds(thresholds::ThresholdsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed.
    Success,
    /// Command failed.
    Error,
    /// The user aborted calibration.
    Aborted,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::Error => Self::from(2),
            ExitCode::Aborted => Self::from(3),
        }
    }
}

/// Resolves the landmark recording from the flag or `capture.landmarks`.
fn landmark_capture(flag: Option<&PathBuf>, config: &AppConfig) -> Result<Arc<ReplayCapture>> {
    let path = flag
        .cloned()
        .or_else(|| config.capture.landmarks.clone())
        .context("No landmark source; pass --landmarks or set capture.landmarks")?;
    Ok(Arc::new(ReplayCapture::new(path)))
}

/// True if `err` is, or wraps, a user-aborted calibration.
fn is_abort(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AttentionError>(),
        Some(AttentionError::CalibrationAborted)
    )
}

/// Builds the multi-threaded runtime used by the server commands.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
