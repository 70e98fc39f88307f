//! JSON file adapter for the calibration thresholds.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use attention_gate_core::{AttentionError, ThresholdSet, ThresholdStore};
use tracing::debug;

/// Default calibration file name.
pub const DEFAULT_THRESHOLDS_FILE: &str = "attention_thresholds.json";

/// Thresholds stored as a pretty-printed JSON object.
///
/// Every `load` reads the file, so a recalibration is picked up by a
/// running session on its next tick.
#[derive(Debug, Clone)]
pub struct JsonThresholdStore {
    path: PathBuf,
}

impl JsonThresholdStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThresholdStore for JsonThresholdStore {
    fn load(&self) -> Result<ThresholdSet, AttentionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AttentionError::ConfigMissing {
                    location: self.location(),
                });
            }
            Err(e) => {
                return Err(AttentionError::InvalidThresholds {
                    location: self.location(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| AttentionError::InvalidThresholds {
            location: self.location(),
            reason: e.to_string(),
        })
    }

    fn save(&self, thresholds: &ThresholdSet) -> Result<()> {
        let dir = target_dir(&self.path);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut file, thresholds)
            .context("Failed to serialize thresholds")?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Wrote thresholds to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Directory the temp file is staged in; a bare file name means the cwd.
fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
