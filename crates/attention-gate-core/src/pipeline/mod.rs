//! Per-frame classification pipeline.
//!
//! Landmarks become ratios, ratios become directions, directions become a
//! single attention sample, and the debouncer turns samples into stable
//! state changes.

mod classifier;
mod debounce;
mod geometry;

pub use classifier::{attention, classify, is_attentive};
pub use debounce::{DebouncePolicy, Debouncer, DEFAULT_WINDOW};
pub use geometry::{axis_ratio, extract_ratios, ratio};
