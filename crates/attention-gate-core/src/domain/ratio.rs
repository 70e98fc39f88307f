//! Geometric ratios derived from landmark positions.

use serde::Serialize;

use super::Landmark;

/// Image axis a ratio is measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal (pixel column).
    X,
    /// Vertical (pixel row).
    Y,
}

/// Identifies one of the six ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatioKind {
    /// Left pupil between the left eye corners.
    LeftEyeHorizontal,
    /// Left pupil between the left eyelids.
    LeftEyeVertical,
    /// Right pupil between the right eye corners.
    RightEyeHorizontal,
    /// Right pupil between the right eyelids.
    RightEyeVertical,
    /// Nose between the outer eye corners.
    FaceHorizontal,
    /// Nose between forehead and chin.
    FaceVertical,
}

impl RatioKind {
    /// Every ratio kind.
    pub const ALL: [Self; 6] = [
        Self::LeftEyeHorizontal,
        Self::LeftEyeVertical,
        Self::RightEyeHorizontal,
        Self::RightEyeVertical,
        Self::FaceHorizontal,
        Self::FaceVertical,
    ];

    /// The reference point, the moving point and the far reference point.
    #[must_use]
    pub const fn points(self) -> (Landmark, Landmark, Landmark) {
        match self {
            Self::LeftEyeHorizontal => (
                Landmark::LeftEyeOuter,
                Landmark::LeftPupil,
                Landmark::LeftEyeInner,
            ),
            Self::LeftEyeVertical => (
                Landmark::LeftEyeTop,
                Landmark::LeftPupil,
                Landmark::LeftEyeBottom,
            ),
            Self::RightEyeHorizontal => (
                Landmark::RightEyeInner,
                Landmark::RightPupil,
                Landmark::RightEyeOuter,
            ),
            Self::RightEyeVertical => (
                Landmark::RightEyeTop,
                Landmark::RightPupil,
                Landmark::RightEyeBottom,
            ),
            Self::FaceVertical => (Landmark::Forehead, Landmark::Nose, Landmark::Chin),
            Self::FaceHorizontal => (
                Landmark::LeftEyeOuter,
                Landmark::Nose,
                Landmark::RightEyeOuter,
            ),
        }
    }

    /// The axis the ratio is measured along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::LeftEyeHorizontal | Self::RightEyeHorizontal | Self::FaceHorizontal => Axis::X,
            Self::LeftEyeVertical | Self::RightEyeVertical | Self::FaceVertical => Axis::Y,
        }
    }
}

/// The six ratios computed for one frame.
///
/// Values are typically within `[0, 3]`; a degenerate span yields `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatioSet {
    /// Left pupil horizontal position.
    pub left_eye_horizontal: f64,
    /// Left pupil vertical position.
    pub left_eye_vertical: f64,
    /// Right pupil horizontal position.
    pub right_eye_horizontal: f64,
    /// Right pupil vertical position.
    pub right_eye_vertical: f64,
    /// Head yaw proxy.
    pub face_horizontal: f64,
    /// Head pitch proxy.
    pub face_vertical: f64,
}

impl RatioSet {
    /// Builds a set by evaluating `f` for every ratio kind.
    pub fn from_fn(mut f: impl FnMut(RatioKind) -> f64) -> Self {
        Self {
            left_eye_horizontal: f(RatioKind::LeftEyeHorizontal),
            left_eye_vertical: f(RatioKind::LeftEyeVertical),
            right_eye_horizontal: f(RatioKind::RightEyeHorizontal),
            right_eye_vertical: f(RatioKind::RightEyeVertical),
            face_horizontal: f(RatioKind::FaceHorizontal),
            face_vertical: f(RatioKind::FaceVertical),
        }
    }

    /// Returns the value of one ratio.
    #[must_use]
    pub const fn get(&self, kind: RatioKind) -> f64 {
        match kind {
            RatioKind::LeftEyeHorizontal => self.left_eye_horizontal,
            RatioKind::LeftEyeVertical => self.left_eye_vertical,
            RatioKind::RightEyeHorizontal => self.right_eye_horizontal,
            RatioKind::RightEyeVertical => self.right_eye_vertical,
            RatioKind::FaceHorizontal => self.face_horizontal,
            RatioKind::FaceVertical => self.face_vertical,
        }
    }

    /// Left and right eye horizontal ratios.
    #[must_use]
    pub const fn eye_horizontal(&self) -> [f64; 2] {
        [self.left_eye_horizontal, self.right_eye_horizontal]
    }

    /// Left and right eye vertical ratios.
    #[must_use]
    pub const fn eye_vertical(&self) -> [f64; 2] {
        [self.left_eye_vertical, self.right_eye_vertical]
    }
}
