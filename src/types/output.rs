//! Output structures for terminal display

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{CheatMode, HapticPattern, Offset, ReasonCode, TiltSample};

/// Output structure for each ingested tilt sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Raw sample as delivered
    pub sample: TiltSample,
    /// Smoothed coin offset
    pub offset: Offset,
    /// Background parallax offset
    pub background: Offset,
    /// Classification of this sample
    pub mode: CheatMode,
    /// Pulse sent to the actuator, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haptic: Option<HapticPattern>,
    /// Reason for the controller decision
    pub reason: ReasonCode,
}

impl TiltOutput {
    /// Create new output
    pub fn new(
        sample: TiltSample,
        offset: Offset,
        background: Offset,
        mode: CheatMode,
        haptic: Option<HapticPattern>,
        reason: ReasonCode,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            sample,
            offset,
            background,
            mode,
            haptic,
            reason,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.mode.color_code();
        let reset = CheatMode::color_reset();
        let buzz = match self.haptic {
            Some(pattern) => format!(" | {}", pattern.to_string().bold()),
            None => String::new(),
        };

        format!(
            "{}{} x={:+.2} y={:+.2} | offset=({:+.2}, {:+.2}) | mode={}{} | {}{}",
            color,
            self.mode.emoji(),
            self.sample.x,
            self.sample.y,
            self.offset.x,
            self.offset.y,
            self.mode,
            buzz,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "x={:.3} | y={:.3} | offset={:.3},{:.3} | mode={} | haptic={} | reason={}",
            self.sample.x,
            self.sample.y,
            self.offset.x,
            self.offset.y,
            self.mode,
            self.haptic.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            self.reason.code()
        )
    }
}

/// Result of a settled flip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipOutcome {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Settled face (true = heads)
    pub heads: bool,
    /// Cumulative coin rotation the animation ends on (degrees)
    pub target_rotation: f32,
    /// Reason code
    pub reason: ReasonCode,
}

impl FlipOutcome {
    pub fn new(heads: bool, target_rotation: f32, reason: ReasonCode) -> Self {
        Self {
            timestamp: Utc::now(),
            heads,
            target_rotation,
            reason,
        }
    }

    pub fn face_label(&self) -> &'static str {
        if self.heads {
            crate::LABEL_HEADS
        } else {
            crate::LABEL_TAILS
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let face = if self.heads {
            self.face_label().yellow().bold()
        } else {
            self.face_label().cyan().bold()
        };
        format!("  ➜ {} (rotation {:.0}°)", face, self.target_rotation)
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "face={} | rotation={:.1} | reason={}",
            self.face_label(),
            self.target_rotation,
            self.reason.code()
        )
    }
}
