//! Haptic actuator capability and the stock actuators

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::HapticPattern;

/// Something that can play a vibration pattern
pub trait HapticActuator: Send {
    /// False on devices without a vibration motor; `play` is then never called
    fn is_available(&self) -> bool {
        true
    }

    fn play(&mut self, pattern: HapticPattern);
}

/// Device without an actuator
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticActuator for NoHaptics {
    fn is_available(&self) -> bool {
        false
    }

    fn play(&mut self, _pattern: HapticPattern) {}
}

/// Terminal bell, one ring per pulse
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl HapticActuator for TerminalBell {
    fn play(&mut self, pattern: HapticPattern) {
        let mut stdout = std::io::stdout();
        for _ in 0..pattern.pulse_count() {
            print!("\x07");
        }
        let _ = stdout.flush();
    }
}

/// Actuator on another device. Nothing plays here; the pattern travels
/// back to the caller in the tilt output and the session counts it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteHaptics;

impl HapticActuator for RemoteHaptics {
    fn play(&mut self, _pattern: HapticPattern) {}
}

/// Shared log of every pattern played
#[derive(Debug, Default, Clone)]
pub struct RecordingHaptics {
    played: Arc<Mutex<Vec<HapticPattern>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns played so far, oldest first
    pub fn played(&self) -> Vec<HapticPattern> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.played.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl HapticActuator for RecordingHaptics {
    fn play(&mut self, pattern: HapticPattern) {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pattern);
    }
}
