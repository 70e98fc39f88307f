//! Threshold persistence port.

use crate::domain::{AttentionError, ThresholdSet};

/// Durable storage for the calibration result.
///
/// Implementations must not cache: every `load` reads the backing store so
/// a recalibration is picked up by a running session.
pub trait ThresholdStore: Send + Sync {
    /// Loads the stored thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`AttentionError::ConfigMissing`] if no calibration exists and
    /// [`AttentionError::InvalidThresholds`] if it cannot be parsed.
    fn load(&self) -> Result<ThresholdSet, AttentionError>;

    /// Replaces the stored thresholds atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn save(&self, thresholds: &ThresholdSet) -> anyhow::Result<()>;

    /// Where the thresholds live, for messages.
    fn location(&self) -> String;
}
