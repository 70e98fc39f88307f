//! Capture ports: the camera plus landmark detector pair.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::domain::LandmarkFrame;

/// A source of detected landmark frames.
pub trait LandmarkStream: Send {
    /// Pulls the next frame.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the device or detector fails.
    fn next_frame(&mut self) -> anyhow::Result<Option<LandmarkFrame>>;

    /// Releases the underlying device. Must be idempotent.
    fn close(&mut self) {}
}

/// Port for acquiring a capture device.
pub trait CaptureBackend: Send + Sync {
    /// Opens a fresh stream for one session or calibration run.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be acquired.
    fn open(&self) -> anyhow::Result<Box<dyn LandmarkStream>>;

    /// Human-readable description of the device.
    fn describe(&self) -> String {
        "capture".to_string()
    }
}

/// Owns an open stream and closes it when dropped.
pub struct CaptureGuard {
    stream: Box<dyn LandmarkStream>,
}

impl CaptureGuard {
    /// Wraps an open stream.
    #[must_use]
    pub fn new(stream: Box<dyn LandmarkStream>) -> Self {
        Self { stream }
    }

    /// Opens a stream from `backend` and guards it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot open the device.
    pub fn open(backend: &dyn CaptureBackend) -> anyhow::Result<Self> {
        backend.open().map(Self::new)
    }
}

impl Deref for CaptureGuard {
    type Target = dyn LandmarkStream;

    fn deref(&self) -> &Self::Target {
        self.stream.as_ref()
    }
}

impl DerefMut for CaptureGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream.as_mut()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.stream.close();
        debug!("Capture released");
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard").finish_non_exhaustive()
    }
}
