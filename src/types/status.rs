//! UI-facing flip status

use serde::{Deserialize, Serialize};

use crate::{LABEL_FLIPPING, LABEL_HEADS, LABEL_IDLE, LABEL_TAILS};

/// What the status line currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlipStatus {
    /// Nothing happening yet
    #[default]
    Idle,
    /// Coin in the air
    Flipping,
    /// Last settled face (true = heads)
    Result { heads: bool },
    /// Transient stealth toggle notice; `seq` identifies which toggle produced it
    StealthMessage { text: String, seq: u64 },
}

impl FlipStatus {
    /// Text for the status line
    pub fn label(&self) -> &str {
        match self {
            FlipStatus::Idle => LABEL_IDLE,
            FlipStatus::Flipping => LABEL_FLIPPING,
            FlipStatus::Result { heads: true } => LABEL_HEADS,
            FlipStatus::Result { heads: false } => LABEL_TAILS,
            FlipStatus::StealthMessage { text, .. } => text,
        }
    }
}

impl std::fmt::Display for FlipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
