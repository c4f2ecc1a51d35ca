//! FairFlip: tilt-biased coin flip core
//!
//! Raw tilt samples → TiltFilter → {smoothed offset, cheat mode} → FlipController
//! → {haptic pattern, flip outcome, status label}

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{FilterConfig, FlipConfig, RandomPolicy};
pub use error::{FlipError, Result};

// =============================================================================
// TILT FILTER [C]
// =============================================================================

/// |x| above this (raw sensor units) selects HEADS / TAILS
pub const DEFAULT_TILT_THRESHOLD: f32 = 3.0;

/// Blend rate of the offset low-pass filter (0 = frozen, 1 = instant)
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.15;

/// Sensor units → coin offset units
pub const DEFAULT_OFFSET_MULTIPLIER: f32 = 3.0;

/// Background parallax as a fraction of the coin offset, applied inverted
pub const DEFAULT_BACKGROUND_RATIO: f32 = 0.3;

// =============================================================================
// FLIP TIMING [C]
// =============================================================================

/// Time from flip request to settled face (milliseconds)
pub const FLIP_SETTLE_MS: u64 = 1500;

/// How long a stealth toggle message stays before reverting to idle (milliseconds)
pub const STEALTH_MESSAGE_MS: u64 = 2000;

/// Minimum spin per flip, in degrees (five full turns)
pub const MIN_SPIN_DEGREES: f32 = 1800.0;

// =============================================================================
// STATUS LABELS
// =============================================================================

pub const LABEL_IDLE: &str = "TAP TO FLIP";
pub const LABEL_FLIPPING: &str = "FLIPPING...";
pub const LABEL_HEADS: &str = "HEADS";
pub const LABEL_TAILS: &str = "TAILS";
pub const STEALTH_ACTIVE_TEXT: &str = "/// STEALTH MODE ACTIVE ///";
pub const CHEAT_READY_TEXT: &str = "/// CHEAT MODE READY ///";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
