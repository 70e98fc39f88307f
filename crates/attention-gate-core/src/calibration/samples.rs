//! Sample collection and reduction into thresholds.

use crate::domain::{AttentionError, RatioSet, ThresholdSet};

use super::CalibrationStep;

/// Ratio samples gathered per calibration step.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSamples {
    steps: [Vec<RatioSet>; 8],
}

impl CalibrationSamples {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one sample for `step`.
    pub fn push(&mut self, step: CalibrationStep, ratios: RatioSet) {
        self.steps[step.slot()].push(ratios);
    }

    /// Samples recorded for `step`.
    #[must_use]
    pub fn get(&self, step: CalibrationStep) -> &[RatioSet] {
        &self.steps[step.slot()]
    }

    /// Reduces the samples into a threshold set.
    ///
    /// Each threshold is the arithmetic mean of the relevant ratio over its
    /// step. Eye thresholds take the larger of the two per-eye means. All
    /// values are rounded to two decimals.
    ///
    /// # Errors
    ///
    /// Returns [`AttentionError::InsufficientSamples`] if any step is empty.
    pub fn reduce(&self) -> Result<ThresholdSet, AttentionError> {
        use CalibrationStep::{
            EyesDown, EyesLeft, EyesRight, EyesUp, HeadDown, HeadLeft, HeadRight, HeadUp,
        };

        let eye_h = |step| -> Result<f64, AttentionError> {
            Ok(self
                .mean(step, |r| r.left_eye_horizontal)?
                .max(self.mean(step, |r| r.right_eye_horizontal)?))
        };
        let eye_v = |step| -> Result<f64, AttentionError> {
            Ok(self
                .mean(step, |r| r.left_eye_vertical)?
                .max(self.mean(step, |r| r.right_eye_vertical)?))
        };
        let face_h = |step| self.mean(step, |r| r.face_horizontal);
        let face_v = |step| self.mean(step, |r| r.face_vertical);

        Ok(ThresholdSet {
            face_horizontal_left: round2(face_h(HeadLeft)?),
            face_horizontal_right: round2(face_h(HeadRight)?),
            face_vertical_up: round2(face_v(HeadUp)?),
            face_vertical_down: round2(face_v(HeadDown)?),
            eye_horizontal_left: round2(eye_h(EyesLeft)?),
            eye_horizontal_right: round2(eye_h(EyesRight)?),
            eye_vertical_up: round2(eye_v(EyesUp)?),
            eye_vertical_down: round2(eye_v(EyesDown)?),
        })
    }

    fn mean(
        &self,
        step: CalibrationStep,
        pick: impl Fn(&RatioSet) -> f64,
    ) -> Result<f64, AttentionError> {
        let samples = self.get(step);
        if samples.is_empty() {
            return Err(AttentionError::InsufficientSamples { step: step.name() });
        }
        #[allow(clippy::cast_precision_loss)]
        let count = samples.len() as f64;
        Ok(samples.iter().map(pick).sum::<f64>() / count)
    }
}

/// Rounds to two decimals; exact ties go to the even digit.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
