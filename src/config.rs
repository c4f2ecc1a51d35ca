//! Session configuration
//!
//! Loaded from a JSON file (`--config`), every field optional. CLI flags
//! are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{FlipError, Result};
use crate::{
    DEFAULT_BACKGROUND_RATIO, DEFAULT_OFFSET_MULTIPLIER, DEFAULT_SMOOTHING_FACTOR,
    DEFAULT_TILT_THRESHOLD, FLIP_SETTLE_MS, STEALTH_MESSAGE_MS,
};

/// How a flip resolves when no cheat mode is armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomPolicy {
    /// Unbiased coin draw, independent of the previous face
    #[default]
    IndependentDraw,
    /// Always land on the opposite of the current face
    Alternate,
}

/// TiltFilter tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Blend rate in (0, 1]
    pub smoothing_factor: f32,
    /// Sensitivity scale from sensor units to offset units
    pub offset_multiplier: f32,
    /// Raw x beyond ±threshold arms HEADS / TAILS
    pub tilt_threshold: f32,
    /// Background parallax strength relative to the coin offset
    pub background_ratio: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            offset_multiplier: DEFAULT_OFFSET_MULTIPLIER,
            tilt_threshold: DEFAULT_TILT_THRESHOLD,
            background_ratio: DEFAULT_BACKGROUND_RATIO,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        let alpha = self.smoothing_factor;
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(FlipError::InvalidConfig(format!(
                "smoothing_factor must be in (0, 1], got {}",
                alpha
            )));
        }
        if !self.tilt_threshold.is_finite() || self.tilt_threshold <= 0.0 {
            return Err(FlipError::InvalidConfig(format!(
                "tilt_threshold must be positive, got {}",
                self.tilt_threshold
            )));
        }
        if !self.offset_multiplier.is_finite() || self.offset_multiplier <= 0.0 {
            return Err(FlipError::InvalidConfig(format!(
                "offset_multiplier must be positive, got {}",
                self.offset_multiplier
            )));
        }
        if !self.background_ratio.is_finite() || self.background_ratio < 0.0 {
            return Err(FlipError::InvalidConfig(format!(
                "background_ratio must be non-negative, got {}",
                self.background_ratio
            )));
        }
        Ok(())
    }
}

/// Full session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipConfig {
    pub filter: FilterConfig,
    /// Flip request → settled face
    pub settle_ms: u64,
    /// Stealth toggle message lifetime
    pub stealth_message_ms: u64,
    pub random_policy: RandomPolicy,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            settle_ms: FLIP_SETTLE_MS,
            stealth_message_ms: STEALTH_MESSAGE_MS,
            random_policy: RandomPolicy::default(),
            seed: None,
        }
    }
}

impl FlipConfig {
    /// Parse a JSON document, then validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FlipConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FlipError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn stealth_message_delay(&self) -> Duration {
        Duration::from_millis(self.stealth_message_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FlipConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = FlipConfig::from_json(r#"{"filter": {"tilt_threshold": 5.0}, "seed": 7}"#).unwrap();
        assert_eq!(config.filter.tilt_threshold, 5.0);
        assert_eq!(config.filter.smoothing_factor, DEFAULT_SMOOTHING_FACTOR);
        assert_eq!(config.settle_ms, FLIP_SETTLE_MS);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.random_policy, RandomPolicy::IndependentDraw);
    }

    #[test]
    fn test_policy_from_json() {
        let config = FlipConfig::from_json(r#"{"random_policy": "alternate"}"#).unwrap();
        assert_eq!(config.random_policy, RandomPolicy::Alternate);
    }

    #[test]
    fn test_rejects_zero_smoothing() {
        let err = FlipConfig::from_json(r#"{"filter": {"smoothing_factor": 0.0}}"#).unwrap_err();
        assert!(matches!(err, FlipError::InvalidConfig(_)));
    }

    #[test]
    fn test_accepts_instant_smoothing() {
        assert!(FlipConfig::from_json(r#"{"filter": {"smoothing_factor": 1.0}}"#).is_ok());
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let err = FlipConfig::from_json(r#"{"filter": {"tilt_threshold": -1.0}}"#).unwrap_err();
        assert!(matches!(err, FlipError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = FlipConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, FlipError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FlipConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FlipError::ConfigRead { .. }));
    }
}
