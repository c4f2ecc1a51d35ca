//! Tilt sources
//!
//! The session only knows the `TiltSource` capability. A platform binding
//! pushes samples into the callback at its own cadence.

use lazy_static::lazy_static;
use regex::Regex;
use std::io::BufRead;

use crate::error::{FlipError, Result};
use crate::types::TiltSample;

/// Callback invoked once per delivered sample
pub type TiltCallback = Box<dyn FnMut(TiltSample) + Send + 'static>;

/// Push-stream of tilt samples
pub trait TiltSource {
    fn subscribe(&mut self, callback: TiltCallback);
}

/// Device without an accelerometer. Never delivers, so the session stays
/// RANDOM with a frozen offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTiltSource;

impl TiltSource for NullTiltSource {
    fn subscribe(&mut self, _callback: TiltCallback) {}
}

/// Fixed sequence, delivered synchronously and in order on subscribe
#[derive(Debug, Default, Clone)]
pub struct ScriptedTiltSource {
    samples: Vec<TiltSample>,
}

impl ScriptedTiltSource {
    pub fn new(samples: Vec<TiltSample>) -> Self {
        Self { samples }
    }

    /// Samples with y = 0 from a list of x readings
    pub fn from_x(xs: &[f32]) -> Self {
        Self::new(xs.iter().map(|&x| TiltSample::new(x, 0.0)).collect())
    }

    /// Parse one sample per line; blank lines and `#` comments are skipped
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut samples = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let sample = parse_sample(trimmed).ok_or(FlipError::MalformedSample {
                line: trimmed.to_string(),
            })?;
            samples.push(sample);
        }
        Ok(Self::new(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TiltSource for ScriptedTiltSource {
    fn subscribe(&mut self, mut callback: TiltCallback) {
        for sample in &self.samples {
            callback(*sample);
        }
    }
}

lazy_static! {
    // "x y", "x,y", "x, y", "x=1.5 y=-2", with optional sign / exponent
    static ref RE_SAMPLE: Regex = Regex::new(
        r"^\s*(?:x\s*=\s*)?([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*[,\s]\s*(?:y\s*=\s*)?([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*$"
    ).unwrap();
}

/// Parse a sample line, None if it is not one
pub fn parse_sample(line: &str) -> Option<TiltSample> {
    let caps = RE_SAMPLE.captures(line)?;
    let x = caps.get(1)?.as_str().parse::<f32>().ok()?;
    let y = caps.get(2)?.as_str().parse::<f32>().ok()?;
    Some(TiltSample::new(x, y))
}
