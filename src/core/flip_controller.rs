//! Flip Controller: hidden cheat state, stealth toggle, haptic dedup, flip lifecycle
//!
//! Tilt handling:
//! - stealth on → ignored, mode stays RANDOM, no pulse
//! - mode != cheat_mode → adopt it; pulse only if mode != last_vibrated
//!
//! Flip lifecycle:
//! - IDLE --(request, not flipping)--> FLIPPING --(settle)--> RESULT(face)
//! - request while FLIPPING is a no-op

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::RandomPolicy;
use crate::types::{CheatMode, FlipStatus, HapticPattern, ReasonCode};
use crate::{CHEAT_READY_TEXT, STEALTH_ACTIVE_TEXT};

/// Controller decision for one classified sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiltDecision {
    /// Pulse to play, if any
    pub haptic: Option<HapticPattern>,
    pub reason: ReasonCode,
}

/// Result of a stealth toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthNotice {
    /// Message for the status line
    pub text: &'static str,
    /// Identifies this toggle when its message is later expired
    pub seq: u64,
    /// Stealth state after the toggle
    pub stealth_on: bool,
}

/// Hidden state machine behind the coin
#[derive(Debug)]
pub struct FlipController {
    stealth_on: bool,
    cheat_mode: CheatMode,
    last_vibrated: CheatMode,
    flipping: bool,
    face_is_heads: bool,
    status: FlipStatus,
    message_seq: u64,
    policy: RandomPolicy,
    rng: StdRng,
    flip_count: u64,
}

impl Default for FlipController {
    fn default() -> Self {
        Self::new(RandomPolicy::default())
    }
}

impl FlipController {
    /// Create controller with an entropy-seeded RNG
    pub fn new(policy: RandomPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    /// Create controller with a fixed seed (reproducible RANDOM flips)
    pub fn with_seed(policy: RandomPolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(policy: RandomPolicy, rng: StdRng) -> Self {
        Self {
            stealth_on: false,
            cheat_mode: CheatMode::Random,
            last_vibrated: CheatMode::Random,
            flipping: false,
            face_is_heads: true,
            status: FlipStatus::Idle,
            message_seq: 0,
            policy,
            rng,
            flip_count: 0,
        }
    }

    /// Handle the classification of one tilt sample
    pub fn on_tilt_classified(&mut self, mode: CheatMode) -> TiltDecision {
        if self.stealth_on {
            return TiltDecision {
                haptic: None,
                reason: ReasonCode::R002_STEALTH_SUPPRESSED,
            };
        }

        if mode == self.cheat_mode {
            return TiltDecision {
                haptic: None,
                reason: ReasonCode::R002_MODE_UNCHANGED,
            };
        }

        debug!(from = %self.cheat_mode, to = %mode, rigged = mode.is_rigged(), "cheat mode changed");
        self.cheat_mode = mode;

        if mode == self.last_vibrated {
            return TiltDecision {
                haptic: None,
                reason: ReasonCode::R003_HAPTIC_DEDUPED,
            };
        }

        // RANDOM has no pattern but still becomes the last vibrated mode,
        // so leaving and re-entering HEADS pulses again
        self.last_vibrated = mode;
        match mode.haptic_pattern() {
            Some(pattern) => TiltDecision {
                haptic: Some(pattern),
                reason: ReasonCode::R003_HAPTIC_EMITTED,
            },
            None => TiltDecision {
                haptic: None,
                reason: ReasonCode::R002_MODE_CHANGED,
            },
        }
    }

    /// Flip stealth. Entering stealth clears any armed bias and haptic memory.
    pub fn toggle_stealth(&mut self) -> StealthNotice {
        self.stealth_on = !self.stealth_on;
        if self.stealth_on {
            self.cheat_mode = CheatMode::Random;
            self.last_vibrated = CheatMode::Random;
        }

        let text = if self.stealth_on {
            STEALTH_ACTIVE_TEXT
        } else {
            CHEAT_READY_TEXT
        };

        self.message_seq += 1;
        let seq = self.message_seq;

        // A flip in flight keeps the status line
        if !self.flipping {
            self.status = FlipStatus::StealthMessage {
                text: text.to_string(),
                seq,
            };
        }

        let reason = if self.stealth_on {
            ReasonCode::R005_STEALTH_ON
        } else {
            ReasonCode::R005_STEALTH_OFF
        };
        info!(seq, reason = reason.code(), "stealth toggled");

        StealthNotice {
            text,
            seq,
            stealth_on: self.stealth_on,
        }
    }

    /// Drop any armed bias and haptic memory. Stealth, face and any
    /// in-flight flip are untouched.
    pub fn clear_bias(&mut self) {
        self.cheat_mode = CheatMode::Random;
        self.last_vibrated = CheatMode::Random;
    }

    /// Revert a stealth message to idle if it is still the one showing
    pub fn expire_stealth_message(&mut self, seq: u64) -> ReasonCode {
        match &self.status {
            FlipStatus::StealthMessage { seq: shown, .. } if *shown == seq && !self.flipping => {
                self.status = FlipStatus::Idle;
                ReasonCode::R005_MESSAGE_EXPIRED
            }
            _ => ReasonCode::R005_MESSAGE_SUPERSEDED,
        }
    }

    /// The single outcome decision point
    pub fn decide_outcome(&mut self, current_face: bool) -> bool {
        match self.cheat_mode {
            CheatMode::Heads => true,
            CheatMode::Tails => false,
            CheatMode::Random => match self.policy {
                RandomPolicy::IndependentDraw => self.rng.gen_bool(0.5),
                RandomPolicy::Alternate => !current_face,
            },
        }
    }

    /// Start a flip. Returns the face it will land on, or None if one is in flight.
    pub fn request_flip(&mut self) -> Option<bool> {
        if self.flipping {
            debug!(reason = ReasonCode::R004_FLIP_IGNORED.code(), "flip ignored");
            return None;
        }

        let next_face = self.decide_outcome(self.face_is_heads);
        self.flipping = true;
        self.status = FlipStatus::Flipping;
        self.flip_count += 1;
        info!(
            flip = self.flip_count,
            reason = ReasonCode::R004_FLIP_STARTED.code(),
            "flip started"
        );

        Some(next_face)
    }

    /// Land the in-flight flip. Returns false if nothing was flipping.
    pub fn finish_flip(&mut self, next_face: bool) -> bool {
        if !self.flipping {
            return false;
        }
        self.face_is_heads = next_face;
        self.flipping = false;
        self.status = FlipStatus::Result { heads: next_face };
        info!(flip = self.flip_count, heads = next_face, "flip settled");
        true
    }

    pub fn is_stealth(&self) -> bool {
        self.stealth_on
    }

    pub fn cheat_mode(&self) -> CheatMode {
        self.cheat_mode
    }

    pub fn last_vibrated(&self) -> CheatMode {
        self.last_vibrated
    }

    pub fn is_flipping(&self) -> bool {
        self.flipping
    }

    pub fn face_is_heads(&self) -> bool {
        self.face_is_heads
    }

    pub fn status(&self) -> &FlipStatus {
        &self.status
    }

    pub fn policy(&self) -> RandomPolicy {
        self.policy
    }

    pub fn flip_count(&self) -> u64 {
        self.flip_count
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn haptic_count(controller: &mut FlipController, modes: &[CheatMode]) -> usize {
        modes
            .iter()
            .filter(|m| controller.on_tilt_classified(**m).haptic.is_some())
            .count()
    }

    #[test]
    fn test_initial_state() {
        let controller = FlipController::default();
        assert!(!controller.is_stealth());
        assert_eq!(controller.cheat_mode(), CheatMode::Random);
        assert_eq!(controller.last_vibrated(), CheatMode::Random);
        assert!(!controller.is_flipping());
        assert!(controller.face_is_heads());
        assert_eq!(controller.status(), &FlipStatus::Idle);
    }

    #[test]
    fn test_heads_pulses_short() {
        let mut controller = FlipController::default();
        let decision = controller.on_tilt_classified(CheatMode::Heads);
        assert_eq!(decision.haptic, Some(HapticPattern::ShortPulse));
        assert_eq!(decision.reason, ReasonCode::R003_HAPTIC_EMITTED);
        assert_eq!(controller.cheat_mode(), CheatMode::Heads);
        assert_eq!(controller.last_vibrated(), CheatMode::Heads);
    }

    #[test]
    fn test_tails_pulses_double() {
        let mut controller = FlipController::default();
        let decision = controller.on_tilt_classified(CheatMode::Tails);
        assert_eq!(decision.haptic, Some(HapticPattern::DoublePulse));
    }

    #[test]
    fn test_holding_tilt_pulses_once() {
        let mut controller = FlipController::default();
        let modes = [CheatMode::Random, CheatMode::Heads, CheatMode::Heads, CheatMode::Heads];
        assert_eq!(haptic_count(&mut controller, &modes), 1);
    }

    #[test]
    fn test_reentry_through_random_pulses_again() {
        let mut controller = FlipController::default();
        let modes = [CheatMode::Random, CheatMode::Heads, CheatMode::Random, CheatMode::Heads];
        assert_eq!(haptic_count(&mut controller, &modes), 2);
    }

    #[test]
    fn test_return_to_random_is_silent() {
        let mut controller = FlipController::default();
        controller.on_tilt_classified(CheatMode::Heads);
        let decision = controller.on_tilt_classified(CheatMode::Random);
        assert_eq!(decision.haptic, None);
        assert_eq!(decision.reason, ReasonCode::R002_MODE_CHANGED);
        assert_eq!(controller.last_vibrated(), CheatMode::Random);
    }

    #[test]
    fn test_stealth_freezes_random() {
        let mut controller = FlipController::default();
        controller.on_tilt_classified(CheatMode::Heads);
        controller.toggle_stealth();
        assert_eq!(controller.cheat_mode(), CheatMode::Random);
        assert_eq!(controller.last_vibrated(), CheatMode::Random);

        for mode in [CheatMode::Heads, CheatMode::Tails, CheatMode::Heads, CheatMode::Random] {
            let decision = controller.on_tilt_classified(mode);
            assert_eq!(decision.haptic, None);
            assert_eq!(decision.reason, ReasonCode::R002_STEALTH_SUPPRESSED);
            assert_eq!(controller.cheat_mode(), CheatMode::Random);
        }
    }

    #[test]
    fn test_leaving_stealth_rearms() {
        let mut controller = FlipController::default();
        controller.toggle_stealth();
        let notice = controller.toggle_stealth();
        assert!(!notice.stealth_on);
        assert_eq!(notice.text, CHEAT_READY_TEXT);
        let decision = controller.on_tilt_classified(CheatMode::Tails);
        assert_eq!(decision.haptic, Some(HapticPattern::DoublePulse));
    }

    #[test]
    fn test_toggle_texts_and_status() {
        let mut controller = FlipController::default();
        let notice = controller.toggle_stealth();
        assert!(notice.stealth_on);
        assert_eq!(notice.text, STEALTH_ACTIVE_TEXT);
        assert_eq!(controller.status().label(), STEALTH_ACTIVE_TEXT);
    }

    #[test]
    fn test_message_expires_to_idle() {
        let mut controller = FlipController::default();
        let notice = controller.toggle_stealth();
        assert_eq!(controller.expire_stealth_message(notice.seq), ReasonCode::R005_MESSAGE_EXPIRED);
        assert_eq!(controller.status(), &FlipStatus::Idle);
    }

    #[test]
    fn test_stale_message_expiry_is_noop() {
        let mut controller = FlipController::default();
        let first = controller.toggle_stealth();
        let second = controller.toggle_stealth();
        assert_eq!(
            controller.expire_stealth_message(first.seq),
            ReasonCode::R005_MESSAGE_SUPERSEDED
        );
        assert_eq!(controller.status().label(), second.text);
    }

    #[test]
    fn test_flip_overrides_stealth_message() {
        let mut controller = FlipController::default();
        let notice = controller.toggle_stealth();
        controller.request_flip();
        assert_eq!(
            controller.expire_stealth_message(notice.seq),
            ReasonCode::R005_MESSAGE_SUPERSEDED
        );
        assert_eq!(controller.status(), &FlipStatus::Flipping);
    }

    #[test]
    fn test_toggle_during_flip_keeps_flipping_label() {
        let mut controller = FlipController::default();
        controller.request_flip();
        controller.toggle_stealth();
        assert!(controller.is_stealth());
        assert_eq!(controller.status(), &FlipStatus::Flipping);
    }

    #[test]
    fn test_decide_outcome_forced() {
        let mut controller = FlipController::default();
        controller.on_tilt_classified(CheatMode::Heads);
        assert!(controller.decide_outcome(true));
        assert!(controller.decide_outcome(false));

        controller.on_tilt_classified(CheatMode::Tails);
        assert!(!controller.decide_outcome(true));
        assert!(!controller.decide_outcome(false));
    }

    #[test]
    fn test_random_draw_is_fair() {
        let mut controller = FlipController::with_seed(RandomPolicy::IndependentDraw, 42);
        let trials = 10_000;
        let heads = (0..trials).filter(|_| controller.decide_outcome(true)).count();
        let freq = heads as f64 / trials as f64;
        // ~5 sigma
        assert!((freq - 0.5).abs() < 0.025, "heads frequency {}", freq);
    }

    #[test]
    fn test_random_draw_is_not_alternation() {
        let mut controller = FlipController::with_seed(RandomPolicy::IndependentDraw, 7);
        let mut face = true;
        let mut repeats = 0;
        for _ in 0..1000 {
            let next = controller.decide_outcome(face);
            if next == face {
                repeats += 1;
            }
            face = next;
        }
        assert!(repeats > 0);
    }

    #[test]
    fn test_alternate_policy() {
        let mut controller = FlipController::new(RandomPolicy::Alternate);
        assert_eq!(controller.policy(), RandomPolicy::Alternate);
        assert!(!controller.decide_outcome(true));
        assert!(controller.decide_outcome(false));
    }

    #[test]
    fn test_flip_lifecycle() {
        let mut controller = FlipController::default();
        controller.on_tilt_classified(CheatMode::Tails);

        let next = controller.request_flip();
        assert_eq!(next, Some(false));
        assert!(controller.is_flipping());
        assert_eq!(controller.status().label(), crate::LABEL_FLIPPING);

        assert!(controller.finish_flip(false));
        assert!(!controller.is_flipping());
        assert!(!controller.face_is_heads());
        assert_eq!(controller.status().label(), crate::LABEL_TAILS);
    }

    #[test]
    fn test_flip_reentry_ignored() {
        let mut controller = FlipController::default();
        controller.request_flip();
        assert_eq!(controller.request_flip(), None);
        assert_eq!(controller.flip_count(), 1);
        assert!(controller.is_flipping());
    }

    #[test]
    fn test_clear_bias_rearms_haptics() {
        let mut controller = FlipController::default();
        controller.on_tilt_classified(CheatMode::Heads);
        controller.clear_bias();
        assert_eq!(controller.cheat_mode(), CheatMode::Random);
        assert_eq!(controller.last_vibrated(), CheatMode::Random);
        let decision = controller.on_tilt_classified(CheatMode::Heads);
        assert_eq!(decision.haptic, Some(HapticPattern::ShortPulse));
    }

    #[test]
    fn test_finish_without_flip_is_noop() {
        let mut controller = FlipController::default();
        assert!(!controller.finish_flip(false));
        assert!(controller.face_is_heads());
        assert_eq!(controller.status(), &FlipStatus::Idle);
    }
}
