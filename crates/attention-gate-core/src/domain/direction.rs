//! Discretized gaze and head directions.

use std::fmt;

use serde::Serialize;

/// Horizontal direction label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Horizontal {
    /// Ratio below the low bound.
    Left,
    /// Ratio within bounds.
    Center,
    /// Ratio above the high bound.
    Right,
}

/// Vertical direction label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Vertical {
    /// Ratio below the low bound.
    Up,
    /// Ratio within bounds.
    Center,
    /// Ratio above the high bound.
    Down,
}

/// Directions for the four classified axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DirectionSet {
    /// Head yaw.
    pub face_horizontal: Horizontal,
    /// Head pitch.
    pub face_vertical: Vertical,
    /// Gaze left/right.
    pub eye_horizontal: Horizontal,
    /// Gaze up/down.
    pub eye_vertical: Vertical,
}

impl DirectionSet {
    /// Every axis centred.
    pub const CENTERED: Self = Self {
        face_horizontal: Horizontal::Center,
        face_vertical: Vertical::Center,
        eye_horizontal: Horizontal::Center,
        eye_vertical: Vertical::Center,
    };

    /// Returns true if all four axes read `Center`.
    #[must_use]
    pub fn is_centered(&self) -> bool {
        *self == Self::CENTERED
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "face={:?}/{:?} eyes={:?}/{:?}",
            self.face_horizontal, self.face_vertical, self.eye_horizontal, self.eye_vertical
        )
    }
}
