//! Outbound play/pause signal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Debounced attention change pushed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// The subject is paying attention.
    Play,
    /// The subject looked away or left the frame.
    Pause,
}

impl Signal {
    /// Maps a debounced attention state to its signal.
    #[must_use]
    pub const fn from_attention(attentive: bool) -> Self {
        if attentive {
            Self::Play
        } else {
            Self::Pause
        }
    }

    /// The wire payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_payloads() {
        assert_eq!(Signal::from_attention(true).as_str(), "play");
        assert_eq!(Signal::from_attention(false).to_string(), "pause");
        assert_eq!(
            serde_json::to_string(&Signal::Pause).expect("serialize"),
            "\"pause\""
        );
    }
}
