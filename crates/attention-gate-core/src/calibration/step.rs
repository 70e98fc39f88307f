//! The eight guided calibration poses.

use std::fmt;

/// One guided pose in the calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationStep {
    /// Head centred, eyes left.
    EyesLeft,
    /// Head centred, eyes right.
    EyesRight,
    /// Head centred, eyes up.
    EyesUp,
    /// Head centred, eyes down.
    EyesDown,
    /// Eyes on screen, head turned left.
    HeadLeft,
    /// Eyes on screen, head turned right.
    HeadRight,
    /// Eyes on screen, head tilted up.
    HeadUp,
    /// Eyes on screen, head tilted down.
    HeadDown,
}

impl CalibrationStep {
    /// Steps in the order they are presented.
    pub const ALL: [Self; 8] = [
        Self::EyesLeft,
        Self::EyesRight,
        Self::EyesUp,
        Self::EyesDown,
        Self::HeadLeft,
        Self::HeadRight,
        Self::HeadUp,
        Self::HeadDown,
    ];

    /// Short identifier used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EyesLeft => "eyes-left",
            Self::EyesRight => "eyes-right",
            Self::EyesUp => "eyes-up",
            Self::EyesDown => "eyes-down",
            Self::HeadLeft => "head-left",
            Self::HeadRight => "head-right",
            Self::HeadUp => "head-up",
            Self::HeadDown => "head-down",
        }
    }

    /// What the user is asked to do.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::EyesLeft => "Keep your head centered and look LEFT with your eyes",
            Self::EyesRight => "Keep your head centered and look RIGHT with your eyes",
            Self::EyesUp => "Keep your head centered and look UP with your eyes",
            Self::EyesDown => "Keep your head centered and look DOWN with your eyes",
            Self::HeadLeft => "Keep your eyes on screen and turn your head LEFT",
            Self::HeadRight => "Keep your eyes on screen and turn your head RIGHT",
            Self::HeadUp => "Keep your eyes on screen and tilt your head UP",
            Self::HeadDown => "Keep your eyes on screen and tilt your head DOWN",
        }
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
