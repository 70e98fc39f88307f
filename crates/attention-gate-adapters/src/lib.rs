//! Attention Gate Adapters - External adapters for attention-gate.
//!
//! This crate provides adapters for:
//! - JSON calibration file storage
//! - Landmark capture replayed from JSON-lines recordings
//! - The WebSocket server that hosts a session

pub mod fs_store;
pub mod replay;
pub mod server;

pub use fs_store::{JsonThresholdStore, DEFAULT_THRESHOLDS_FILE};
pub use replay::{JsonlLandmarkStream, ReplayCapture};
pub use server::{AttentionServer, ServerConfig, ServerStatus, StopReport};
