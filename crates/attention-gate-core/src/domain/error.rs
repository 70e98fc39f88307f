//! Error taxonomy for classification, calibration and session lifecycle.

use std::time::Duration;

use thiserror::Error;

use super::LifecycleState;

/// Errors surfaced by the attention pipeline and its lifecycle.
#[derive(Debug, Error)]
pub enum AttentionError {
    /// No calibration has been stored yet.
    #[error("no calibration found at {location}; run `attention-gate calibrate` first")]
    ConfigMissing {
        /// Where the thresholds were looked for.
        location: String,
    },

    /// The stored calibration could not be read or parsed.
    #[error("invalid calibration at {location}: {reason}")]
    InvalidThresholds {
        /// Where the thresholds were read from.
        location: String,
        /// What was wrong with them.
        reason: String,
    },

    /// The frame source failed or ran dry.
    #[error("capture failed: {0}")]
    CaptureFailure(String),

    /// The listening endpoint could not be bound.
    #[error("cannot listen on {addr}: {reason}")]
    PortUnavailable {
        /// Requested address.
        addr: String,
        /// Underlying bind error.
        reason: String,
    },

    /// The user cancelled calibration.
    #[error("calibration aborted")]
    CalibrationAborted,

    /// A calibration step finished without usable samples.
    #[error("calibration step '{step}' produced no samples")]
    InsufficientSamples {
        /// Step name.
        step: &'static str,
    },

    /// The session loop did not exit in time and was torn down forcibly.
    #[error("session loop did not stop within {waited:?}")]
    ShutdownTimeout {
        /// How long the manager waited.
        waited: Duration,
    },

    /// A session already owns the capture device.
    #[error("a session is already {state}")]
    SessionActive {
        /// State of the existing session.
        state: LifecycleState,
    },

    /// Calibration currently owns the capture device.
    #[error("calibration is in progress")]
    CalibrationInProgress,

    /// A restart was requested too soon after the last stop.
    #[error("restart blocked by cooldown, {}s remaining", remaining.as_secs().max(1))]
    Cooldown {
        /// Time left before a start is accepted.
        remaining: Duration,
    },

    /// Stop was requested with no running session.
    #[error("no session is running")]
    NotRunning,
}
