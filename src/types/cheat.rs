//! Cheat mode definitions

use serde::{Deserialize, Serialize};

use crate::types::HapticPattern;

/// Hidden bias armed by tilting the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheatMode {
    /// Tilted past +threshold, next flip lands heads
    Heads,
    /// Tilted past -threshold, next flip lands tails
    Tails,
    /// Roughly level, fair flip
    #[default]
    Random,
}

impl CheatMode {
    /// Pulse that confirms this mode to the holder, if any
    pub fn haptic_pattern(&self) -> Option<HapticPattern> {
        match self {
            CheatMode::Heads => Some(HapticPattern::ShortPulse),
            CheatMode::Tails => Some(HapticPattern::DoublePulse),
            CheatMode::Random => None,
        }
    }

    /// Is a bias armed?
    pub fn is_rigged(&self) -> bool {
        !matches!(self, CheatMode::Random)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            CheatMode::Heads => "\x1b[33m",  // Gold
            CheatMode::Tails => "\x1b[36m",  // Cyan
            CheatMode::Random => "\x1b[90m", // Gray
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for mode
    pub fn emoji(&self) -> &'static str {
        match self {
            CheatMode::Heads => "🌕",
            CheatMode::Tails => "🌑",
            CheatMode::Random => "🪙",
        }
    }
}

impl std::fmt::Display for CheatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheatMode::Heads => "HEADS",
            CheatMode::Tails => "TAILS",
            CheatMode::Random => "RANDOM",
        };
        write!(f, "{}", name)
    }
}
