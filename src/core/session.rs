//! Flip session: one filter + controller pair for one foreground session
//!
//! `FlipSession` is the synchronous core. `SessionHandle` wraps it in a
//! mutex so sensor delivery, user actions and timers are serialised, and
//! owns the tokio timers for flip settle and stealth message revert.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::FlipConfig;
use crate::core::flip_controller::{FlipController, StealthNotice};
use crate::core::haptics::HapticActuator;
use crate::core::source::TiltSource;
use crate::core::spin::SpinPlan;
use crate::core::tilt_filter::TiltFilter;
use crate::types::{FlipOutcome, FlipStatus, Offset, ReasonCode, TiltOutput, TiltSample};

/// An accepted flip waiting for its settle timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipTicket {
    /// Face decided at request time
    pub heads: bool,
    /// Rotation the animation runs to
    pub spin: SpinPlan,
    /// Flip number within the session
    pub flip: u64,
}

/// Snapshot broadcast to observers on every state change
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub offset: Offset,
    pub background: Offset,
    pub status: String,
    pub flipping: bool,
    pub heads: bool,
    pub rotation: f32,
    pub listening: bool,
}

/// Synchronous session core
pub struct FlipSession {
    config: FlipConfig,
    filter: TiltFilter,
    controller: FlipController,
    haptics: Box<dyn HapticActuator>,
    /// Resting coin rotation in degrees, as left by the last spin
    rotation: f32,
    listening: bool,
    haptic_count: u64,
}

impl std::fmt::Debug for FlipSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipSession")
            .field("filter", &self.filter)
            .field("controller", &self.controller)
            .field("rotation", &self.rotation)
            .field("listening", &self.listening)
            .field("haptic_count", &self.haptic_count)
            .finish()
    }
}

impl FlipSession {
    /// Create a stopped session
    pub fn new(config: FlipConfig, haptics: Box<dyn HapticActuator>) -> Self {
        let controller = match config.seed {
            Some(seed) => FlipController::with_seed(config.random_policy, seed),
            None => FlipController::new(config.random_policy),
        };
        Self {
            filter: TiltFilter::new(config.filter),
            controller,
            haptics,
            rotation: 0.0,
            listening: false,
            haptic_count: 0,
            config,
        }
    }

    /// Begin accepting samples
    pub fn start(&mut self) {
        if !self.listening {
            info!("session listening");
        }
        self.listening = true;
    }

    /// Stop accepting samples. Tilt state goes with the sensor: the filter
    /// returns to rest and any armed bias is dropped, so a restart begins
    /// RANDOM. Face and rotation are kept for the display.
    pub fn stop(&mut self) {
        if self.listening {
            info!(samples = self.filter.sample_count(), "session stopped");
        }
        self.listening = false;
        self.filter.reset();
        self.controller.clear_bias();
    }

    /// Process one sensor delivery. None while not listening.
    pub fn ingest(&mut self, sample: TiltSample) -> Option<TiltOutput> {
        if !self.listening {
            debug!(reason = ReasonCode::R006_NOT_LISTENING.code(), "sample dropped");
            return None;
        }

        let (offset, mode) = self.filter.update(sample);
        debug!(x = sample.x, y = sample.y, reason = ReasonCode::for_mode(mode).code(), "sample");
        let decision = self.controller.on_tilt_classified(mode);

        let mut reason = decision.reason;
        let haptic = match decision.haptic {
            Some(pattern) if self.haptics.is_available() => {
                self.haptics.play(pattern);
                self.haptic_count += 1;
                info!(pattern = %pattern, "haptic");
                Some(pattern)
            }
            Some(_) => {
                reason = ReasonCode::R003_HAPTIC_UNAVAILABLE;
                None
            }
            None => None,
        };

        Some(TiltOutput::new(
            sample,
            offset,
            self.filter.background_offset(),
            mode,
            haptic,
            reason,
        ))
    }

    /// Accept a flip unless one is already in flight
    pub fn request_flip(&mut self) -> Option<FlipTicket> {
        let heads = self.controller.request_flip()?;
        let spin = SpinPlan::new(self.rotation, heads);
        self.rotation = spin.to;
        Some(FlipTicket {
            heads,
            spin,
            flip: self.controller.flip_count(),
        })
    }

    /// Land a flip. The outcome is the one decided at request time.
    pub fn settle(&mut self, ticket: FlipTicket) -> Option<FlipOutcome> {
        if !self.controller.finish_flip(ticket.heads) {
            warn!(flip = ticket.flip, "settle without flip in flight");
            return None;
        }
        Some(FlipOutcome::new(
            ticket.heads,
            ticket.spin.to,
            ReasonCode::R004_FLIP_SETTLED,
        ))
    }

    pub fn toggle_stealth(&mut self) -> StealthNotice {
        self.controller.toggle_stealth()
    }

    pub fn expire_stealth_message(&mut self, seq: u64) -> ReasonCode {
        self.controller.expire_stealth_message(seq)
    }

    pub fn update(&self) -> SessionUpdate {
        SessionUpdate {
            offset: self.filter.offset(),
            background: self.filter.background_offset(),
            status: self.controller.status().label().to_string(),
            flipping: self.controller.is_flipping(),
            heads: self.controller.face_is_heads(),
            rotation: self.rotation,
            listening: self.listening,
        }
    }

    pub fn config(&self) -> &FlipConfig {
        &self.config
    }

    pub fn filter(&self) -> &TiltFilter {
        &self.filter
    }

    pub fn controller(&self) -> &FlipController {
        &self.controller
    }

    pub fn status(&self) -> &FlipStatus {
        self.controller.status()
    }

    pub fn offset(&self) -> Offset {
        self.filter.offset()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_flipping(&self) -> bool {
        self.controller.is_flipping()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn haptic_count(&self) -> u64 {
        self.haptic_count
    }
}

/// A flip whose settle timer is running
#[derive(Debug)]
pub struct PendingFlip {
    pub ticket: FlipTicket,
    timer: JoinHandle<Option<FlipOutcome>>,
}

impl PendingFlip {
    /// Wait for the settle timer and return the landed outcome
    pub async fn settled(self) -> Option<FlipOutcome> {
        self.timer.await.ok().flatten()
    }
}

/// Shared, timer-driving handle to a session
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<FlipSession>>,
    updates: broadcast::Sender<SessionUpdate>,
    settle_delay: Duration,
    message_delay: Duration,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("settle_delay", &self.settle_delay)
            .field("message_delay", &self.message_delay)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub fn new(config: FlipConfig, haptics: Box<dyn HapticActuator>) -> Self {
        let settle_delay = config.settle_delay();
        let message_delay = config.stealth_message_delay();
        let (updates, _) = broadcast::channel(100);
        Self {
            inner: Arc::new(Mutex::new(FlipSession::new(config, haptics))),
            updates,
            settle_delay,
            message_delay,
        }
    }

    /// Lock the session. A panic in another holder does not wedge the session.
    pub fn lock(&self) -> MutexGuard<'_, FlipSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) {
        self.lock().start();
        self.publish();
    }

    pub fn stop(&self) {
        self.lock().stop();
        self.publish();
    }

    /// Route a source's deliveries into this session. Each accepted sample's
    /// output is forwarded on the returned channel for the rendering side.
    pub fn attach(&self, source: &mut dyn TiltSource) -> mpsc::UnboundedReceiver<TiltOutput> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.clone();
        source.subscribe(Box::new(move |sample| {
            if let Some(output) = handle.ingest(sample) {
                // Renderer gone is not an error for the sensor path
                let _ = tx.send(output);
            }
        }));
        rx
    }

    pub fn ingest(&self, sample: TiltSample) -> Option<TiltOutput> {
        let output = self.lock().ingest(sample);
        if output.is_some() {
            self.publish();
        }
        output
    }

    /// Accept a flip and arm exactly one settle timer. None while flipping.
    pub fn request_flip(&self) -> Option<PendingFlip> {
        let ticket = self.lock().request_flip()?;
        self.publish();

        let handle = self.clone();
        let delay = self.settle_delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = handle.lock().settle(ticket);
            handle.publish();
            outcome
        });

        Some(PendingFlip { ticket, timer })
    }

    /// Toggle stealth and arm the message revert timer
    pub fn toggle_stealth(&self) -> StealthNotice {
        let notice = self.lock().toggle_stealth();
        self.publish();

        let handle = self.clone();
        let delay = self.message_delay;
        let seq = notice.seq;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reason = handle.lock().expire_stealth_message(seq);
            debug!(seq, reason = reason.code(), "stealth message timer");
            if reason == ReasonCode::R005_MESSAGE_EXPIRED {
                handle.publish();
            }
        });

        notice
    }

    pub fn snapshot(&self) -> SessionUpdate {
        self.lock().update()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    fn publish(&self) {
        let update = self.lock().update();
        // No receivers is fine
        let _ = self.updates.send(update);
    }
}

// =============================================================================
// TESTS
// =============================================================================
