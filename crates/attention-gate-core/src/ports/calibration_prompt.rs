//! User interaction during calibration.

use crate::calibration::CalibrationStep;
use crate::domain::ThresholdSet;

/// What the user chose at a step prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    /// Begin capturing samples for this step.
    Capture,
    /// Cancel the whole calibration.
    Abort,
}

/// Port for guiding the user through calibration steps.
pub trait CalibrationPrompt {
    /// Announces a step and blocks until the user decides.
    ///
    /// `index` is 0-based; `total` is the number of steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot read input. The calibrator
    /// treats this as an abort.
    fn begin_step(
        &mut self,
        step: CalibrationStep,
        index: usize,
        total: usize,
    ) -> anyhow::Result<PromptAction>;

    /// Reports capture progress within the current step.
    fn sample_captured(&mut self, _step: CalibrationStep, _captured: usize, _required: usize) {}

    /// Polled between samples; returning true aborts calibration.
    fn abort_requested(&mut self) -> bool {
        false
    }

    /// Called once the thresholds have been saved.
    fn finished(&mut self, _thresholds: &ThresholdSet) {}
}
