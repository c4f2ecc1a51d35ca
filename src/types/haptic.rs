//! Haptic pattern tokens

use serde::{Deserialize, Serialize};

/// Abstract vibration pattern handed to the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HapticPattern {
    /// One light tick
    ShortPulse,
    /// Heavy double tick
    DoublePulse,
}

impl HapticPattern {
    /// Waveform timings in milliseconds, alternating off/on starting with a delay.
    /// A single entry is a one-shot pulse of that length.
    pub fn timings_ms(&self) -> &'static [u64] {
        match self {
            HapticPattern::ShortPulse => &[50],
            HapticPattern::DoublePulse => &[0, 70, 50, 70],
        }
    }

    /// Number of distinct pulses in the pattern
    pub fn pulse_count(&self) -> usize {
        match self {
            HapticPattern::ShortPulse => 1,
            HapticPattern::DoublePulse => 2,
        }
    }
}

impl std::fmt::Display for HapticPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HapticPattern::ShortPulse => "SHORT_PULSE",
            HapticPattern::DoublePulse => "DOUBLE_PULSE",
        };
        write!(f, "{}", name)
    }
}
