//! Tilt Filter: smoothed parallax offset + instantaneous cheat classification
//!
//! Per sample:
//! - target = (-x, y) * offset_multiplier
//! - smoothed += (target - smoothed) * smoothing_factor
//! - mode from RAW x: x > threshold → HEADS, x < -threshold → TAILS, else RANDOM
//!
//! Classification bypasses smoothing and has no hysteresis band.

use crate::config::FilterConfig;
use crate::types::{CheatMode, Offset, TiltSample};

/// Single-pole low-pass on the offset, memoryless threshold on the mode
#[derive(Debug, Clone)]
pub struct TiltFilter {
    config: FilterConfig,
    /// Smoothed coin offset
    smoothed: Offset,
    /// Mode of the most recent sample
    last_mode: CheatMode,
    /// Number of samples seen
    sample_count: u64,
}

impl Default for TiltFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl TiltFilter {
    /// Create new filter at rest
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            smoothed: Offset::ZERO,
            last_mode: CheatMode::Random,
            sample_count: 0,
        }
    }

    /// Feed one raw sample, return the updated offset and this sample's mode
    pub fn update(&mut self, raw: TiltSample) -> (Offset, CheatMode) {
        let k = self.config.offset_multiplier;
        let alpha = self.config.smoothing_factor;

        // Inverted x: the coin slides the way the device leans
        let target_x = -raw.x * k;
        let target_y = raw.y * k;

        self.smoothed.x += (target_x - self.smoothed.x) * alpha;
        self.smoothed.y += (target_y - self.smoothed.y) * alpha;

        let mode = self.classify(raw.x);
        self.last_mode = mode;
        self.sample_count += 1;

        (self.smoothed, mode)
    }

    /// Classify a raw x reading against the configured threshold
    pub fn classify(&self, x: f32) -> CheatMode {
        classify(x, self.config.tilt_threshold)
    }

    /// Current smoothed coin offset
    pub fn offset(&self) -> Offset {
        self.smoothed
    }

    /// Star-field offset: opposite direction, scaled down
    pub fn background_offset(&self) -> Offset {
        self.smoothed.scale(-self.config.background_ratio)
    }

    pub fn last_mode(&self) -> CheatMode {
        self.last_mode
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Back to rest
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

/// Memoryless threshold classifier. NaN compares false both ways and lands on RANDOM.
pub fn classify(x: f32, threshold: f32) -> CheatMode {
    if x > threshold {
        CheatMode::Heads
    } else if x < -threshold {
        CheatMode::Tails
    } else {
        CheatMode::Random
    }
}

// =============================================================================
// TESTS
// =============================================================================
