//! JSON Lines session event output.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use attention_gate_core::{SessionEvent, SessionObserver};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

/// One output line: the event's fields plus a timestamp.
#[derive(Serialize)]
struct Record<'a> {
    #[serde(flatten)]
    event: &'a SessionEvent,
    timestamp: String,
}

/// Writes each session event as one JSON object per line.
pub struct JsonlEventOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonlEventOutput {
    /// Creates an output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates an output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn write_line(&self, event: &SessionEvent) -> anyhow::Result<()> {
        let record = Record {
            event,
            timestamp: OffsetDateTime::now_utc().format(&Rfc3339)?,
        };
        let json = serde_json::to_string(&record)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}

impl SessionObserver for JsonlEventOutput {
    fn on_event(&self, event: SessionEvent) {
        if let Err(e) = self.write_line(&event) {
            warn!("Failed to write session event: {e:#}");
        }
    }
}
