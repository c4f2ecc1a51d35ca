//! Tilt sample and offset vectors

use serde::{Deserialize, Serialize};

/// One raw accelerometer reading on the two horizontal axes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TiltSample {
    /// Left/right tilt
    pub x: f32,
    /// Forward/back tilt
    pub y: f32,
}

impl TiltSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D offset in display units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, k: f32) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
        }
    }
}
