//! Start/stop/calibrate state machine guarding the capture device.
//!
//! Pure bookkeeping: callers pass the current instant in, so the cooldown
//! can be exercised without waiting.

use std::time::{Duration, Instant};

use tracing::info;

use crate::domain::{AttentionError, LifecycleState};

/// Lifecycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Minimum time between a completed stop and the next start.
    pub cooldown: Duration,
    /// How long a stop waits for the loop before tearing it down.
    pub shutdown_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Snapshot returned by [`Lifecycle::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleStatus {
    /// Current state.
    pub state: LifecycleState,
    /// Time left before a start is accepted, if any.
    pub cooldown_remaining: Option<Duration>,
}

/// Single-owner state machine for sessions and calibration.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    cooldown: Duration,
    stopped_at: Option<Instant>,
    before_calibration: LifecycleState,
}

impl Lifecycle {
    /// Creates an idle lifecycle.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            state: LifecycleState::Idle,
            cooldown,
            stopped_at: None,
            before_calibration: LifecycleState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// State plus remaining cooldown.
    #[must_use]
    pub fn status(&self, now: Instant) -> LifecycleStatus {
        LifecycleStatus {
            state: self.state,
            cooldown_remaining: self.cooldown_remaining(now),
        }
    }

    /// Time left in the post-stop cooldown, if it is still running.
    #[must_use]
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let stopped_at = self.stopped_at?;
        let remaining = self
            .cooldown
            .saturating_sub(now.saturating_duration_since(stopped_at));
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Checks whether a session may start, without changing state.
    ///
    /// # Errors
    ///
    /// Rejects with [`AttentionError::SessionActive`],
    /// [`AttentionError::CalibrationInProgress`] or
    /// [`AttentionError::Cooldown`].
    pub fn check_start(&self, now: Instant) -> Result<(), AttentionError> {
        match self.state {
            LifecycleState::Running | LifecycleState::Stopping => {
                Err(AttentionError::SessionActive { state: self.state })
            }
            LifecycleState::Calibrating => Err(AttentionError::CalibrationInProgress),
            LifecycleState::Idle | LifecycleState::Stopped => {
                match self.cooldown_remaining(now) {
                    Some(remaining) => Err(AttentionError::Cooldown { remaining }),
                    None => Ok(()),
                }
            }
        }
    }

    /// Marks a session as running.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_start`].
    pub fn begin_session(&mut self, now: Instant) -> Result<(), AttentionError> {
        self.check_start(now)?;
        self.transition(LifecycleState::Running);
        Ok(())
    }

    /// Moves a running session to stopping.
    ///
    /// # Errors
    ///
    /// Returns [`AttentionError::NotRunning`] unless the state is running.
    pub fn begin_stop(&mut self) -> Result<(), AttentionError> {
        if self.state != LifecycleState::Running {
            return Err(AttentionError::NotRunning);
        }
        self.transition(LifecycleState::Stopping);
        Ok(())
    }

    /// Completes a stop and starts the cooldown.
    pub fn finish_stop(&mut self, now: Instant) {
        self.stopped_at = Some(now);
        self.transition(LifecycleState::Stopped);
    }

    /// Reserves the capture device for calibration.
    ///
    /// Calibration is not subject to the restart cooldown.
    ///
    /// # Errors
    ///
    /// Rejects with [`AttentionError::SessionActive`] while a session owns
    /// the device, or [`AttentionError::CalibrationInProgress`].
    pub fn begin_calibration(&mut self) -> Result<(), AttentionError> {
        match self.state {
            LifecycleState::Running | LifecycleState::Stopping => {
                Err(AttentionError::SessionActive { state: self.state })
            }
            LifecycleState::Calibrating => Err(AttentionError::CalibrationInProgress),
            LifecycleState::Idle | LifecycleState::Stopped => {
                self.before_calibration = self.state;
                self.transition(LifecycleState::Calibrating);
                Ok(())
            }
        }
    }

    /// Releases the calibration reservation, restoring the prior state.
    pub fn end_calibration(&mut self) {
        if self.state == LifecycleState::Calibrating {
            self.transition(self.before_calibration);
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        info!("Lifecycle {} -> {}", self.state, next);
        self.state = next;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(LifecycleConfig::default().cooldown)
    }
}
