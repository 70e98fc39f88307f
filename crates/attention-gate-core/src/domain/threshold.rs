//! Calibrated classification thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight calibrated thresholds.
///
/// Serialized with the upper-case keys used by the calibration file,
/// e.g. `FACE_HORIZONTAL_LEFT`. Each LEFT/UP bound is expected to sit below
/// its RIGHT/DOWN partner; [`ThresholdSet::inverted_pairs`] reports pairs
/// where it does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ThresholdSet {
    /// Face horizontal ratio below which the head is turned left.
    pub face_horizontal_left: f64,
    /// Face horizontal ratio above which the head is turned right.
    pub face_horizontal_right: f64,
    /// Face vertical ratio below which the head is tilted up.
    pub face_vertical_up: f64,
    /// Face vertical ratio above which the head is tilted down.
    pub face_vertical_down: f64,
    /// Eye horizontal ratio below which the eyes look left.
    pub eye_horizontal_left: f64,
    /// Eye horizontal ratio above which the eyes look right.
    pub eye_horizontal_right: f64,
    /// Eye vertical ratio below which the eyes look up.
    pub eye_vertical_up: f64,
    /// Eye vertical ratio above which the eyes look down.
    pub eye_vertical_down: f64,
}

/// A low/high threshold pair for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Below this the negative label (Left/Up) applies.
    pub low: f64,
    /// Above this the positive label (Right/Down) applies.
    pub high: f64,
}

/// A threshold pair whose low bound is not below its high bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvertedPair {
    /// Name of the low bound key.
    pub low_key: &'static str,
    /// Name of the high bound key.
    pub high_key: &'static str,
    /// The pair's values.
    pub bounds: Bounds,
}

impl fmt::Display for InvertedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}) is not below {} ({:.2})",
            self.low_key, self.bounds.low, self.high_key, self.bounds.high
        )
    }
}

impl ThresholdSet {
    /// Face horizontal bounds.
    #[must_use]
    pub const fn face_horizontal(&self) -> Bounds {
        Bounds {
            low: self.face_horizontal_left,
            high: self.face_horizontal_right,
        }
    }

    /// Face vertical bounds.
    #[must_use]
    pub const fn face_vertical(&self) -> Bounds {
        Bounds {
            low: self.face_vertical_up,
            high: self.face_vertical_down,
        }
    }

    /// Eye horizontal bounds.
    #[must_use]
    pub const fn eye_horizontal(&self) -> Bounds {
        Bounds {
            low: self.eye_horizontal_left,
            high: self.eye_horizontal_right,
        }
    }

    /// Eye vertical bounds.
    #[must_use]
    pub const fn eye_vertical(&self) -> Bounds {
        Bounds {
            low: self.eye_vertical_up,
            high: self.eye_vertical_down,
        }
    }

    /// Lists every pair whose low bound is not strictly below its high bound.
    ///
    /// Classification still runs with inverted pairs; callers decide whether
    /// to warn.
    #[must_use]
    pub fn inverted_pairs(&self) -> Vec<InvertedPair> {
        [
            ("FACE_HORIZONTAL_LEFT", "FACE_HORIZONTAL_RIGHT", self.face_horizontal()),
            ("FACE_VERTICAL_UP", "FACE_VERTICAL_DOWN", self.face_vertical()),
            ("EYE_HORIZONTAL_LEFT", "EYE_HORIZONTAL_RIGHT", self.eye_horizontal()),
            ("EYE_VERTICAL_UP", "EYE_VERTICAL_DOWN", self.eye_vertical()),
        ]
        .into_iter()
        .filter(|(_, _, bounds)| bounds.low >= bounds.high)
        .map(|(low_key, high_key, bounds)| InvertedPair {
            low_key,
            high_key,
            bounds,
        })
        .collect()
    }
}
