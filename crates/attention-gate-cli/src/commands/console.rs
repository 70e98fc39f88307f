//! Console command - interactive start/stop/calibrate control loop.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use attention_gate_adapters::{AttentionServer, JsonThresholdStore, ServerStatus};
use attention_gate_core::ports::{NoopObserver, SystemClock};
use attention_gate_core::LifecycleState;
use clap::Args;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{is_abort, landmark_capture, runtime, ExitCode};
use crate::config::AppConfig;
use crate::output::TerminalPrompt;

/// Arguments for `console`.
#[derive(Args, Clone)]
pub struct ConsoleArgs {
    /// JSON-lines landmark recording to replay as the camera
    #[arg(long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Port to listen on while a session runs
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Host to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Calibration file (overrides thresholds.file)
    #[arg(long, value_name = "FILE")]
    pub thresholds: Option<PathBuf>,
}

/// A console command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a session.
    Start,
    /// Stop the running session.
    Stop,
    /// Run guided calibration.
    Calibrate,
    /// Print the lifecycle status.
    Status,
    /// Stop any session and leave.
    Quit,
    /// List commands.
    Help,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "calibrate" => Ok(Self::Calibrate),
            "status" => Ok(Self::Status),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "help" | "?" => Ok(Self::Help),
            other => Err(format!("unknown command '{other}'; try 'help'")),
        }
    }
}

const HELP: &str = "commands: start, stop, calibrate, status, quit";

/// Run the console command.
pub fn run(args: &ConsoleArgs, config: &AppConfig) -> Result<ExitCode> {
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

    let server = AttentionServer::new(
        server_config,
        capture,
        Arc::new(store),
        Arc::new(NoopObserver),
    );
    let rt = runtime()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    Console::new(&server, &rt).run(&mut input, &mut io::stdout())?;
    Ok(ExitCode::Success)
}

/// Line-oriented controller over an [`AttentionServer`].
pub struct Console<'a> {
    server: &'a AttentionServer,
    rt: &'a Runtime,
    show_bar: bool,
}

impl<'a> Console<'a> {
    /// Creates a console driving `server` on `rt`.
    #[must_use]
    pub const fn new(server: &'a AttentionServer, rt: &'a Runtime) -> Self {
        Self {
            server,
            rt,
            show_bar: true,
        }
    }

    /// Reads commands until `quit` or end of input.
    ///
    /// Command failures are reported and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the terminal cannot be read or written.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        writeln!(out, "{HELP}")?;
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let mut line = String::new();
            if input
                .read_line(&mut line)
                .context("Failed to read command")?
                == 0
            {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<ConsoleCommand>() {
                Ok(command) => command,
                Err(msg) => {
                    writeln!(out, "{msg}")?;
                    continue;
                }
            };
            debug!("Console command {command:?}");
            if command == ConsoleCommand::Quit {
                break;
            }
            let reply = self.execute(command, input);
            writeln!(out, "{reply}")?;
        }

        if self.server.status().state == LifecycleState::Running {
            let report = self.rt.block_on(self.server.stop())?;
            writeln!(out, "session stopped ({})", report.outcome)?;
        }
        Ok(())
    }

    fn execute<R: BufRead>(&self, command: ConsoleCommand, input: &mut R) -> String {
        match command {
            ConsoleCommand::Start => match self.rt.block_on(self.server.start()) {
                Ok(addr) => format!("session running on ws://{addr}/"),
                Err(e) => format!("error: {e:#}"),
            },
            ConsoleCommand::Stop => match self.rt.block_on(self.server.stop()) {
                Ok(report) if report.forced => {
                    format!("session stopped ({}, forced)", report.outcome)
                }
                Ok(report) => format!("session stopped ({})", report.outcome),
                Err(e) => format!("error: {e:#}"),
            },
            ConsoleCommand::Calibrate => {
                let mut prompt = TerminalPrompt::new(&mut *input, io::stderr());
                if !self.show_bar {
                    prompt = prompt.without_bar();
                }
                match self.server.calibrate(&mut prompt, SystemClock) {
                    Ok(_) => "calibration saved".to_string(),
                    Err(e) if is_abort(&e) => "calibration aborted".to_string(),
                    Err(e) => format!("error: {e:#}"),
                }
            }
            ConsoleCommand::Status => describe(&self.server.status()),
            ConsoleCommand::Help | ConsoleCommand::Quit => HELP.to_string(),
        }
    }
}

/// Formats a status line, e.g. `state: stopped, cooldown 12s`.
fn describe(status: &ServerStatus) -> String {
    let mut line = format!("state: {}", status.state);
    if let Some(remaining) = status.cooldown_remaining {
        let _ = write!(line, ", cooldown {}s", remaining.as_secs().max(1));
    }
    if let Some(addr) = status.addr {
        let _ = write!(line, ", listening on ws://{addr}/");
    }
    if status.client_connected {
        line.push_str(", client connected");
    }
    line
}
