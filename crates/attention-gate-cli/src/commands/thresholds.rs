//! Thresholds command - inspect the stored calibration.

use std::path::PathBuf;

use anyhow::Result;
use attention_gate_adapters::JsonThresholdStore;
use attention_gate_core::ThresholdStore;
use clap::{Args, Subcommand};
use tracing::warn;

use super::ExitCode;
use crate::config::AppConfig;

/// Arguments for `thresholds`.
#[derive(Args, Clone)]
pub struct ThresholdsArgs {
    /// Calibration file (overrides thresholds.file)
    #[arg(long, global = true, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ThresholdsAction,
}

/// Thresholds subcommands
#[derive(Subcommand, Clone, Copy)]
pub enum ThresholdsAction {
    /// Print the stored thresholds as JSON
    Show,
    /// Print where the thresholds are stored
    Path,
}

/// Run the thresholds command.
pub fn run(args: &ThresholdsArgs, config: &AppConfig) -> Result<ExitCode> {
    let store = JsonThresholdStore::new(
        args.file
            .clone()
            .unwrap_or_else(|| config.thresholds_file()),
    );

    match args.action {
        ThresholdsAction::Path => println!("{}", store.path().display()),
        ThresholdsAction::Show => {
            let thresholds = store.load()?;
            for pair in thresholds.inverted_pairs() {
                warn!("Inverted thresholds: {pair}");
            }
            println!("{}", serde_json::to_string_pretty(&thresholds)?);
        }
    }
    Ok(ExitCode::Success)
}
