//! Test support utilities for attention-gate.
//!
//! Provides mocks of every core port and builders for synthetic faces in
//! known poses.
//!
//! # Example
//!
//! ```
//! use attention_gate_test_support::{FaceBuilder, MemoryThresholdStore, ScriptedCapture};
//!
//! let looking_away = FaceBuilder::new().head(0.1, 0.5).build();
//! let capture = ScriptedCapture::new(vec![FaceBuilder::attentive(), looking_away]);
//! let store = MemoryThresholdStore::with(attention_gate_test_support::standard_thresholds());
//! # let _ = (capture, store);
//! ```

mod builders;
mod mocks;

pub use builders::{calibration_frames, standard_thresholds, write_jsonl, FaceBuilder};
pub use mocks::{
    ManualClock, MemoryThresholdStore, RecordingObserver, ScriptedCapture, ScriptedLandmarkStream,
    ScriptedPrompt,
};
