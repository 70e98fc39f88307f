//! Session state and the per-tick driver.

mod runner;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{LandmarkFrame, Signal, ThresholdSet};
use crate::pipeline::{
    attention, classify, extract_ratios, DebouncePolicy, Debouncer, DEFAULT_WINDOW,
};
use crate::ports::ThresholdStore;

pub use runner::run_session;

/// Tunables for a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Period between classification ticks.
    pub tick_interval: Duration,
    /// Debounce window capacity.
    pub debounce_window: usize,
    /// When a partial window may report consensus.
    pub debounce_policy: DebouncePolicy,
    /// Longest a single signal send may wait on the channel.
    pub send_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            debounce_window: DEFAULT_WINDOW,
            debounce_policy: DebouncePolicy::AgreeSoFar,
            send_timeout: Duration::from_millis(250),
        }
    }
}

/// Why a session loop exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// A stop was requested.
    Stopped,
    /// The frame source reported exhaustion.
    CaptureEnded,
    /// The frame source failed.
    CaptureFailed(String),
    /// The signal channel's receiver went away.
    ChannelClosed,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::CaptureEnded => f.write_str("capture ended"),
            Self::CaptureFailed(reason) => write!(f, "capture failed: {reason}"),
            Self::ChannelClosed => f.write_str("channel closed"),
        }
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The raw attention sample, or `None` if the tick was skipped.
    pub attentive: Option<bool>,
    /// `Some(present)` when face presence flipped on this tick.
    pub face_changed: Option<bool>,
    /// Signal to emit, if the debounced state changed.
    pub signal: Option<Signal>,
}

/// Attention history and last emitted state for one session.
#[derive(Debug, Clone)]
pub struct AttentionSession {
    debouncer: Debouncer,
    last_emitted: bool,
    thresholds: Option<ThresholdSet>,
    reload_failing: bool,
    face_present: Option<bool>,
}

impl AttentionSession {
    /// Creates a session with an empty history. The initial state is
    /// "not attentive", so the first emitted signal is always `play`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce_window, config.debounce_policy),
            last_emitted: false,
            thresholds: None,
            reload_failing: false,
            face_present: None,
        }
    }

    /// The last state sent to the client.
    #[must_use]
    pub const fn last_emitted(&self) -> bool {
        self.last_emitted
    }

    /// Processes one frame end to end.
    pub fn tick(&mut self, frame: &LandmarkFrame, store: &dyn ThresholdStore) -> TickReport {
        let landmarks = frame.landmarks();
        let present = landmarks.is_some();
        let face_changed = (self.face_present != Some(present)).then_some(present);
        self.face_present = Some(present);

        let attentive = match landmarks {
            None => Some(false),
            Some(landmarks) => self.reload(store).map(|thresholds| {
                let directions = classify(&extract_ratios(&landmarks), &thresholds);
                let attentive = attention(&directions);
                debug!("{directions} attentive={attentive}");
                attentive
            }),
        };

        TickReport {
            attentive,
            face_changed,
            signal: attentive.and_then(|sample| self.record(sample)),
        }
    }

    /// Feeds one sample to the debouncer.
    ///
    /// Returns a signal only when the debounced state differs from the last
    /// one emitted.
    pub fn record(&mut self, sample: bool) -> Option<Signal> {
        let consensus = self.debouncer.push(sample)?;
        if consensus == self.last_emitted {
            return None;
        }
        self.last_emitted = consensus;
        Some(Signal::from_attention(consensus))
    }

    /// Reloads thresholds, falling back to the last good set.
    fn reload(&mut self, store: &dyn ThresholdStore) -> Option<ThresholdSet> {
        match store.load() {
            Ok(thresholds) => {
                if self.reload_failing {
                    info!("Thresholds reloaded from {}", store.location());
                    self.reload_failing = false;
                }
                self.thresholds = Some(thresholds);
            }
            Err(e) => {
                if !self.reload_failing {
                    match self.thresholds {
                        Some(_) => warn!("Threshold reload failed, keeping last good set: {e}"),
                        None => warn!("Threshold reload failed, skipping ticks: {e}"),
                    }
                    self.reload_failing = true;
                }
            }
        }
        self.thresholds
    }
}
