//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod calibration_prompt;
mod clock;
mod landmark_stream;
mod observer;
mod threshold_store;

pub use calibration_prompt::{CalibrationPrompt, PromptAction};
pub use clock::{Clock, SystemClock};
pub use landmark_stream::{CaptureBackend, CaptureGuard, LandmarkStream};
pub use observer::{NoopObserver, SessionEvent, SessionObserver};
pub use threshold_store::ThresholdStore;
