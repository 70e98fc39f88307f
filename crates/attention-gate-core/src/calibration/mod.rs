//! Guided calibration deriving per-user thresholds.
//!
//! The user holds eight extreme poses in turn. For each pose a fixed number
//! of ratio samples is captured at a fixed interval; the per-pose means
//! become the eight thresholds.

mod samples;
mod step;

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::domain::{AttentionError, ThresholdSet};
use crate::pipeline::extract_ratios;
use crate::ports::{CalibrationPrompt, Clock, LandmarkStream, PromptAction, SystemClock, ThresholdStore};

pub use samples::CalibrationSamples;
pub use step::CalibrationStep;

/// Timing and sample counts for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    /// Samples captured per step.
    pub samples_per_step: usize,
    /// Delay after each captured sample.
    pub sample_interval: Duration,
    /// Delay after each completed step.
    pub settle_delay: Duration,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples_per_step: 10,
            sample_interval: Duration::from_millis(200),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// Runs the calibration sequence against a landmark stream.
#[derive(Debug, Clone)]
pub struct Calibrator<C = SystemClock> {
    config: CalibrationConfig,
    clock: C,
}

impl Calibrator<SystemClock> {
    /// Creates a calibrator that sleeps in real time.
    #[must_use]
    pub const fn new(config: CalibrationConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Calibrator<C> {
    /// Creates a calibrator with an injected clock.
    #[must_use]
    pub const fn with_clock(config: CalibrationConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Walks every step and gathers samples.
    ///
    /// Frames without a face are skipped and do not count toward a step.
    ///
    /// # Errors
    ///
    /// Returns [`AttentionError::CalibrationAborted`] if the user aborts or
    /// the prompt fails, and [`AttentionError::CaptureFailure`] if the
    /// stream errors or runs dry before a step is complete.
    pub fn collect(
        &self,
        stream: &mut dyn LandmarkStream,
        prompt: &mut dyn CalibrationPrompt,
    ) -> Result<CalibrationSamples, AttentionError> {
        let total = CalibrationStep::ALL.len();
        let required = self.config.samples_per_step;
        let mut samples = CalibrationSamples::new();

        for (index, step) in CalibrationStep::ALL.into_iter().enumerate() {
            match prompt.begin_step(step, index, total) {
                Ok(PromptAction::Capture) => {}
                Ok(PromptAction::Abort) => {
                    info!("Calibration aborted at step {step}");
                    return Err(AttentionError::CalibrationAborted);
                }
                Err(e) => {
                    warn!("Calibration prompt failed at step {step}: {e:#}");
                    return Err(AttentionError::CalibrationAborted);
                }
            }

            let mut captured = 0;
            while captured < required {
                if prompt.abort_requested() {
                    info!("Calibration aborted during step {step}");
                    return Err(AttentionError::CalibrationAborted);
                }

                let frame = stream
                    .next_frame()
                    .map_err(|e| AttentionError::CaptureFailure(format!("{e:#}")))?
                    .ok_or_else(|| {
                        AttentionError::CaptureFailure(format!(
                            "landmark stream ended during step {step}"
                        ))
                    })?;

                let Some(landmarks) = frame.landmarks() else {
                    debug!("No face detected, waiting");
                    continue;
                };

                samples.push(step, extract_ratios(&landmarks));
                captured += 1;
                prompt.sample_captured(step, captured, required);
                self.clock.sleep(self.config.sample_interval);
            }

            debug!("Captured {captured} samples for step {step}");
            self.clock.sleep(self.config.settle_delay);
        }

        Ok(samples)
    }

    /// Collects samples, reduces them and saves the result.
    ///
    /// Nothing is written unless every step completes.
    ///
    /// # Errors
    ///
    /// Returns the collection or reduction error, or a save failure.
    pub fn calibrate(
        &self,
        stream: &mut dyn LandmarkStream,
        store: &dyn ThresholdStore,
        prompt: &mut dyn CalibrationPrompt,
    ) -> anyhow::Result<ThresholdSet> {
        info!("Starting calibration ({} steps)", CalibrationStep::ALL.len());
        let samples = self.collect(stream, prompt)?;
        let thresholds = samples.reduce()?;

        for pair in thresholds.inverted_pairs() {
            warn!("Calibration produced an inverted pair: {pair}");
        }

        store
            .save(&thresholds)
            .with_context(|| format!("Failed to save thresholds to {}", store.location()))?;
        info!("Saved thresholds to {}", store.location());

        prompt.finished(&thresholds);
        Ok(thresholds)
    }
}
