//! Core modules for FairFlip

pub mod api;
pub mod flip_controller;
pub mod haptics;
pub mod session;
pub mod source;
pub mod spin;
pub mod tilt_filter;

pub use api::{create_router, run_server};
pub use flip_controller::{FlipController, StealthNotice, TiltDecision};
pub use haptics::{HapticActuator, NoHaptics, RecordingHaptics, RemoteHaptics, TerminalBell};
pub use session::{FlipSession, FlipTicket, PendingFlip, SessionHandle, SessionUpdate};
pub use source::{parse_sample, NullTiltSource, ScriptedTiltSource, TiltCallback, TiltSource};
pub use spin::{target_rotation, SpinPlan};
pub use tilt_filter::{classify, TiltFilter};
