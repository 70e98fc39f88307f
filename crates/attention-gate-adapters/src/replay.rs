//! Recorded landmark capture replayed from a JSON-lines file.
//!
//! Each non-blank line is one frame:
//! `{"width":640,"height":480,"face":[{"x":0.51,"y":0.42,"z":-0.01}, ...]}`.
//! A missing or `null` `face` means the detector found nothing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use attention_gate_core::{CaptureBackend, LandmarkFrame, LandmarkStream};
use tracing::debug;

/// Streams frames from any buffered reader of JSON lines.
pub struct JsonlLandmarkStream<R> {
    reader: Option<R>,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonlLandmarkStream<R> {
    /// Wraps a reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            line: 0,
            buf: String::new(),
        }
    }
}

impl JsonlLandmarkStream<BufReader<File>> {
    /// Opens a recording on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open landmark recording {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Send> LandmarkStream for JsonlLandmarkStream<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            self.buf.clear();
            let read = reader
                .read_line(&mut self.buf)
                .with_context(|| format!("Failed to read line {}", self.line + 1))?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid landmark frame on line {}", self.line))?;
            return Ok(Some(frame));
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("Closed landmark recording after {} lines", self.line);
        }
    }
}

/// Capture backend replaying a recording file.
///
/// Every `open` starts from the beginning of the file.
#[derive(Debug, Clone)]
pub struct ReplayCapture {
    path: PathBuf,
}

impl ReplayCapture {
    /// Creates a backend for the recording at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureBackend for ReplayCapture {
    fn open(&self) -> Result<Box<dyn LandmarkStream>> {
        let stream = JsonlLandmarkStream::open(&self.path)?;
        debug!("Opened landmark recording {}", self.path.display());
        Ok(Box::new(stream))
    }

    fn describe(&self) -> String {
        format!("replay of {}", self.path.display())
    }
}
