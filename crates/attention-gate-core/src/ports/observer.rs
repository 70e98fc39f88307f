//! Session monitoring port.

use serde::Serialize;

use crate::domain::Signal;
use crate::session::SessionOutcome;

/// Events emitted by a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session loop began ticking.
    Started {
        /// Tick period in milliseconds.
        tick_interval_ms: u64,
    },
    /// A debounced state change was emitted.
    Signal {
        /// The emitted signal.
        signal: Signal,
        /// Tick number (1-based).
        tick: u64,
    },
    /// A face was present on the previous tick but not on this one.
    FaceLost {
        /// Tick number.
        tick: u64,
    },
    /// A face reappeared after being absent.
    FaceFound {
        /// Tick number.
        tick: u64,
    },
    /// The session loop exited.
    Stopped {
        /// Why it exited.
        outcome: SessionOutcome,
        /// Ticks processed.
        ticks: u64,
    },
}

/// Port for receiving session events.
pub trait SessionObserver: Send + Sync {
    /// Called when a session event occurs.
    fn on_event(&self, event: SessionEvent);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&self, _event: SessionEvent) {}
}
