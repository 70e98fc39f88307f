//! Attention Gate Core - Domain logic for landmark-driven attention signalling
//!
//! This crate turns face landmarks into a debounced play/pause signal. It holds
//! the domain types, the classification pipeline, guided calibration, the
//! session loop and the lifecycle state machine, plus the ports adapters
//! implement.

pub mod calibration;
pub mod domain;
pub mod lifecycle;
pub mod pipeline;
pub mod ports;
pub mod session;

#[cfg(test)]
mod testing;

pub use calibration::{CalibrationConfig, CalibrationSamples, CalibrationStep, Calibrator};
pub use domain::{
    AttentionError, DirectionSet, LandmarkFrame, LifecycleState, RatioSet, Signal, ThresholdSet,
};
pub use lifecycle::{Lifecycle, LifecycleConfig, LifecycleStatus};
pub use ports::{
    CalibrationPrompt, CaptureBackend, CaptureGuard, Clock, LandmarkStream, PromptAction,
    SessionEvent, SessionObserver, ThresholdStore,
};
pub use session::{run_session, AttentionSession, SessionConfig, SessionOutcome};
