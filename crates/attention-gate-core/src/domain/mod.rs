//! Core domain types for attention classification.

mod direction;
mod error;
mod landmark;
mod ratio;
mod signal;
mod state;
mod threshold;

pub use direction::{DirectionSet, Horizontal, Vertical};
pub use error::AttentionError;
pub use landmark::{FaceMesh, Landmark, LandmarkFrame, LandmarkSet, MeshPoint, PixelPoint};
pub use ratio::{Axis, RatioKind, RatioSet};
pub use signal::Signal;
pub use state::LifecycleState;
pub use threshold::{Bounds, InvertedPair, ThresholdSet};
