//! Reason codes for every decision the flip core makes

use serde::{Deserialize, Serialize};

use crate::types::CheatMode;

/// Reason codes for classifications, transitions and side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Classification
    // =========================================================================
    /// Raw x above +threshold
    R001_TILT_HEADS,
    /// Raw x below -threshold
    R001_TILT_TAILS,
    /// Raw x within ±threshold
    R001_TILT_LEVEL,

    // =========================================================================
    // R002: Cheat mode
    // =========================================================================
    /// Cheat mode changed, no pulse due
    R002_MODE_CHANGED,
    /// Classification matches current cheat mode
    R002_MODE_UNCHANGED,
    /// Stealth active, tilt ignored
    R002_STEALTH_SUPPRESSED,

    // =========================================================================
    // R003: Haptics
    // =========================================================================
    /// Mode changed and differs from last vibrated, pulse emitted
    R003_HAPTIC_EMITTED,
    /// Mode changed back to an already vibrated mode
    R003_HAPTIC_DEDUPED,
    /// Pulse due but the device has no actuator
    R003_HAPTIC_UNAVAILABLE,

    // =========================================================================
    // R004: Flip lifecycle
    // =========================================================================
    /// Flip accepted, coin in the air
    R004_FLIP_STARTED,
    /// Flip requested while another is in flight
    R004_FLIP_IGNORED,
    /// Flip settled on its face
    R004_FLIP_SETTLED,

    // =========================================================================
    // R005: Stealth
    // =========================================================================
    /// Stealth switched on, bias cleared
    R005_STEALTH_ON,
    /// Stealth switched off, tilt armed again
    R005_STEALTH_OFF,
    /// Stealth message reverted to idle
    R005_MESSAGE_EXPIRED,
    /// Stealth message already replaced by a flip or a newer toggle
    R005_MESSAGE_SUPERSEDED,

    // =========================================================================
    // R006: Session
    // =========================================================================
    /// Sample arrived while the session was not listening
    R006_NOT_LISTENING,
}

impl ReasonCode {
    /// Classification code for a cheat mode
    pub fn for_mode(mode: CheatMode) -> Self {
        match mode {
            CheatMode::Heads => Self::R001_TILT_HEADS,
            CheatMode::Tails => Self::R001_TILT_TAILS,
            CheatMode::Random => Self::R001_TILT_LEVEL,
        }
    }

    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_TILT_HEADS => "R001_TILT_HEADS",
            Self::R001_TILT_TAILS => "R001_TILT_TAILS",
            Self::R001_TILT_LEVEL => "R001_TILT_LEVEL",
            Self::R002_MODE_CHANGED => "R002_MODE_CHANGED",
            Self::R002_MODE_UNCHANGED => "R002_MODE_UNCHANGED",
            Self::R002_STEALTH_SUPPRESSED => "R002_STEALTH_SUPPRESSED",
            Self::R003_HAPTIC_EMITTED => "R003_HAPTIC_EMITTED",
            Self::R003_HAPTIC_DEDUPED => "R003_HAPTIC_DEDUPED",
            Self::R003_HAPTIC_UNAVAILABLE => "R003_HAPTIC_UNAVAILABLE",
            Self::R004_FLIP_STARTED => "R004_FLIP_STARTED",
            Self::R004_FLIP_IGNORED => "R004_FLIP_IGNORED",
            Self::R004_FLIP_SETTLED => "R004_FLIP_SETTLED",
            Self::R005_STEALTH_ON => "R005_STEALTH_ON",
            Self::R005_STEALTH_OFF => "R005_STEALTH_OFF",
            Self::R005_MESSAGE_EXPIRED => "R005_MESSAGE_EXPIRED",
            Self::R005_MESSAGE_SUPERSEDED => "R005_MESSAGE_SUPERSEDED",
            Self::R006_NOT_LISTENING => "R006_NOT_LISTENING",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_TILT_HEADS => "Tilted toward heads",
            Self::R001_TILT_TAILS => "Tilted toward tails",
            Self::R001_TILT_LEVEL => "Device level",
            Self::R002_MODE_CHANGED => "Cheat mode changed",
            Self::R002_MODE_UNCHANGED => "Cheat mode unchanged",
            Self::R002_STEALTH_SUPPRESSED => "Stealth active - tilt ignored",
            Self::R003_HAPTIC_EMITTED => "Haptic confirmation sent",
            Self::R003_HAPTIC_DEDUPED => "Mode already confirmed",
            Self::R003_HAPTIC_UNAVAILABLE => "No vibration actuator",
            Self::R004_FLIP_STARTED => "Flip started",
            Self::R004_FLIP_IGNORED => "Flip already in progress",
            Self::R004_FLIP_SETTLED => "Flip settled",
            Self::R005_STEALTH_ON => "Stealth mode on",
            Self::R005_STEALTH_OFF => "Cheat mode ready",
            Self::R005_MESSAGE_EXPIRED => "Stealth message cleared",
            Self::R005_MESSAGE_SUPERSEDED => "Stealth message already replaced",
            Self::R006_NOT_LISTENING => "Session not listening",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
