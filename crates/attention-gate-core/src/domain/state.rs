//! Session lifecycle states.

use std::fmt;

use serde::Serialize;

/// Externally visible state of the capture-owning lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Nothing has run yet.
    Idle,
    /// A session loop owns the capture device and the endpoint.
    Running,
    /// A stop was requested and teardown is in progress.
    Stopping,
    /// The last session ended; restarts are subject to cooldown.
    Stopped,
    /// Calibration owns the capture device.
    Calibrating,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Calibrating => "calibrating",
        })
    }
}
