//! Serve command - run one session until Ctrl-C or the capture ends.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use attention_gate_adapters::{AttentionServer, JsonThresholdStore};
use attention_gate_core::ports::NoopObserver;
use attention_gate_core::{AttentionError, SessionObserver};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use super::{landmark_capture, runtime, ExitCode};
use crate::config::AppConfig;
use crate::output::JsonlEventOutput;

/// Session event output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventFormat {
    /// JSON Lines on stdout
    Jsonl,
}

/// Arguments for `serve`.
#[derive(Args, Clone)]
pub struct ServeArgs {
    /// JSON-lines landmark recording to replay as the camera
    #[arg(long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Port to listen on (0 picks a free port)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Host to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Calibration file to read (overrides thresholds.file)
    #[arg(long, value_name = "FILE")]
    pub thresholds: Option<PathBuf>,

    /// Print session events
    #[arg(long, value_enum)]
    pub events: Option<EventFormat>,
}

/// Run the serve command.
pub fn run(args: &ServeArgs, config: &AppConfig) -> Result<ExitCode> {
    let capture = landmark_capture(args.landmarks.as_ref(), config)?;
    let store = JsonThresholdStore::new(
        args.thresholds
            .clone()
            .unwrap_or_else(|| config.thresholds_file()),
    );

    let mut server_config = config.server();
    if let Some(ref host) = args.host {
        server_config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let observer: Arc<dyn SessionObserver> = match args.events {
        Some(EventFormat::Jsonl) => Arc::new(JsonlEventOutput::stdout()),
        None => Arc::new(NoopObserver),
    };
    let server = AttentionServer::new(server_config, capture, Arc::new(store), observer);

    runtime()?.block_on(serve(&server))?;
    Ok(ExitCode::Success)
}

async fn serve(server: &AttentionServer) -> Result<()> {
    let addr = server.start().await?;
    eprintln!("Listening on ws://{addr}/");

    tokio::select! {
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping session");
            match server.stop().await {
                Ok(report) => {
                    if report.forced {
                        warn!("Session loop had to be aborted");
                    }
                    info!("Session ended: {}", report.outcome);
                }
                // The capture ended while the interrupt was being handled.
                Err(e) if matches!(
                    e.downcast_ref::<AttentionError>(),
                    Some(AttentionError::NotRunning)
                ) => {}
                Err(e) => return Err(e),
            }
        }
        () = server.wait_until_stopped() => {
            info!("Session ended on its own");
        }
    }
    Ok(())
}
