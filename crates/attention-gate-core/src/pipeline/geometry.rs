//! Ratio extraction from pixel landmarks.

use crate::domain::{Axis, LandmarkSet, RatioKind, RatioSet};

/// Relative position of `moving` between `reference` and `far` on one axis.
///
/// Computes `|reference - moving| / |reference - far|`, or `0.0` when the
/// span is zero.
#[must_use]
pub fn axis_ratio(reference: i32, moving: i32, far: i32) -> f64 {
    let reference = f64::from(reference);
    let span = (reference - f64::from(far)).abs();
    if span == 0.0 {
        return 0.0;
    }
    (reference - f64::from(moving)).abs() / span
}

/// Computes one ratio from a landmark set.
#[must_use]
pub fn ratio(landmarks: &LandmarkSet, kind: RatioKind) -> f64 {
    let (reference, moving, far) = kind.points();
    let pick = |landmark| {
        let point = landmarks.get(landmark);
        match kind.axis() {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    };
    axis_ratio(pick(reference), pick(moving), pick(far))
}

/// Computes all six ratios for a frame.
#[must_use]
pub fn extract_ratios(landmarks: &LandmarkSet) -> RatioSet {
    RatioSet::from_fn(|kind| ratio(landmarks, kind))
}
