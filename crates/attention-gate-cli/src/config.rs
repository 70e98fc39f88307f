//! Configuration file support for attention-gate.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/attention-gate/config.toml` (lowest priority)
//! - Project-local: `.attention-gate.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied by each command)

use std::path::{Path, PathBuf};
use std::time::Duration;

use attention_gate_adapters::{ServerConfig, DEFAULT_THRESHOLDS_FILE};
use attention_gate_core::pipeline::DebouncePolicy;
use attention_gate_core::{CalibrationConfig, LifecycleConfig, SessionConfig};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint and session timing.
    pub server: ServerSection,
    /// Attention history settings.
    pub debounce: DebounceSection,
    /// Guided calibration timing.
    pub calibration: CalibrationSection,
    /// Calibration file location.
    pub thresholds: ThresholdsSection,
    /// Landmark source.
    pub capture: CaptureSection,
}

/// `[server]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Session tick period in milliseconds.
    pub tick_ms: Option<u64>,
    /// Minimum seconds between a stop and the next start.
    pub cooldown_secs: Option<u64>,
    /// Seconds a stop waits for the session loop.
    pub shutdown_timeout_secs: Option<u64>,
    /// Milliseconds a signal may wait for channel space.
    pub send_timeout_ms: Option<u64>,
}

/// `[debounce]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DebounceSection {
    /// Number of recent samples considered.
    pub window: Option<usize>,
    /// Only emit once the window is full.
    pub require_full_window: Option<bool>,
}

/// `[calibration]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    /// Samples captured per step.
    pub samples_per_step: Option<usize>,
    /// Milliseconds between samples.
    pub sample_interval_ms: Option<u64>,
    /// Milliseconds of rest after each step.
    pub settle_ms: Option<u64>,
}

/// `[thresholds]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdsSection {
    /// Calibration file path.
    pub file: Option<PathBuf>,
}

/// `[capture]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSection {
    /// JSON-lines landmark recording to replay.
    pub landmarks: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/attention-gate/config.toml`
    /// 2. Project-local: `.attention-gate.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.validate() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Lists out-of-range values. Offending values fall back to defaults.
    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.server.tick_ms == Some(0) {
            problems.push("server.tick_ms must be at least 1".to_string());
        }
        if self.server.send_timeout_ms == Some(0) {
            problems.push("server.send_timeout_ms must be at least 1".to_string());
        }
        if self.debounce.window == Some(0) {
            problems.push("debounce.window must be at least 1".to_string());
        }
        if self.calibration.samples_per_step == Some(0) {
            problems.push("calibration.samples_per_step must be at least 1".to_string());
        }
        if let Some(ref host) = self.server.host {
            if host.trim().is_empty() {
                problems.push("server.host must not be empty".to_string());
            }
        }
        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.server.host = other.server.host.or_else(|| self.server.host.take());
        self.server.port = other.server.port.or(self.server.port);
        self.server.tick_ms = other.server.tick_ms.or(self.server.tick_ms);
        self.server.cooldown_secs = other.server.cooldown_secs.or(self.server.cooldown_secs);
        self.server.shutdown_timeout_secs = other
            .server
            .shutdown_timeout_secs
            .or(self.server.shutdown_timeout_secs);
        self.server.send_timeout_ms = other
            .server
            .send_timeout_ms
            .or(self.server.send_timeout_ms);

        self.debounce.window = other.debounce.window.or(self.debounce.window);
        self.debounce.require_full_window = other
            .debounce
            .require_full_window
            .or(self.debounce.require_full_window);

        self.calibration.samples_per_step = other
            .calibration
            .samples_per_step
            .or(self.calibration.samples_per_step);
        self.calibration.sample_interval_ms = other
            .calibration
            .sample_interval_ms
            .or(self.calibration.sample_interval_ms);
        self.calibration.settle_ms = other.calibration.settle_ms.or(self.calibration.settle_ms);

        self.thresholds.file = other
            .thresholds
            .file
            .or_else(|| self.thresholds.file.take());

        self.capture.landmarks = other
            .capture
            .landmarks
            .or_else(|| self.capture.landmarks.take());
    }

    /// Session tunables with defaults for unset or invalid values.
    #[must_use]
    pub fn session(&self) -> SessionConfig {
        let defaults = SessionConfig::default();
        let policy = if self.debounce.require_full_window.unwrap_or(false) {
            DebouncePolicy::FullWindow
        } else {
            DebouncePolicy::AgreeSoFar
        };
        SessionConfig {
            tick_interval: positive_millis(self.server.tick_ms).unwrap_or(defaults.tick_interval),
            debounce_window: self
                .debounce
                .window
                .filter(|w| *w > 0)
                .unwrap_or(defaults.debounce_window),
            debounce_policy: policy,
            send_timeout: positive_millis(self.server.send_timeout_ms)
                .unwrap_or(defaults.send_timeout),
        }
    }

    /// Cooldown and shutdown timing.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleConfig {
        let defaults = LifecycleConfig::default();
        LifecycleConfig {
            cooldown: self
                .server
                .cooldown_secs
                .map_or(defaults.cooldown, Duration::from_secs),
            shutdown_timeout: self
                .server
                .shutdown_timeout_secs
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
        }
    }

    /// Calibration timing.
    #[must_use]
    pub fn calibration(&self) -> CalibrationConfig {
        let defaults = CalibrationConfig::default();
        CalibrationConfig {
            samples_per_step: self
                .calibration
                .samples_per_step
                .filter(|n| *n > 0)
                .unwrap_or(defaults.samples_per_step),
            sample_interval: self
                .calibration
                .sample_interval_ms
                .map_or(defaults.sample_interval, Duration::from_millis),
            settle_delay: self
                .calibration
                .settle_ms
                .map_or(defaults.settle_delay, Duration::from_millis),
        }
    }

    /// Full server configuration, before CLI overrides.
    #[must_use]
    pub fn server(&self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self
                .server
                .host
                .clone()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: self.server.port.unwrap_or(defaults.port),
            session: self.session(),
            lifecycle: self.lifecycle(),
            calibration: self.calibration(),
        }
    }

    /// Calibration file path.
    #[must_use]
    pub fn thresholds_file(&self) -> PathBuf {
        self.thresholds
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_THRESHOLDS_FILE))
    }
}

fn positive_millis(value: Option<u64>) -> Option<Duration> {
    value.filter(|ms| *ms > 0).map(Duration::from_millis)
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("attention-gate").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.attention-gate.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".attention-gate.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
