//! Core types for FairFlip

mod cheat;
mod haptic;
mod output;
mod reason;
mod status;
mod tilt;

pub use cheat::CheatMode;
pub use haptic::HapticPattern;
pub use output::{FlipOutcome, TiltOutput};
pub use reason::ReasonCode;
pub use status::FlipStatus;
pub use tilt::{Offset, TiltSample};
