//! Integration tests for the flip path
//!
//! Tests the FlipSession contract:
//! - outcome decided once, at request time
//! - stealth freezes the bias and silences haptics
//! - flip re-entrancy is a no-op

use fairflip::core::{FlipSession, NoHaptics, RecordingHaptics, ScriptedTiltSource, SessionHandle};
use fairflip::types::{CheatMode, FlipStatus, HapticPattern, TiltSample};
use fairflip::{FlipConfig, RandomPolicy, LABEL_FLIPPING, LABEL_HEADS, LABEL_IDLE, STEALTH_ACTIVE_TEXT};
use pretty_assertions::assert_eq;

fn started(recorder: &RecordingHaptics, config: FlipConfig) -> FlipSession {
    let mut session = FlipSession::new(config, Box::new(recorder.clone()));
    session.start();
    session
}

fn seeded() -> FlipConfig {
    FlipConfig {
        seed: Some(1234),
        ..FlipConfig::default()
    }
}

// =============================================================================
// RIGGED FLIPS
// =============================================================================

#[test]
fn test_heads_tilt_forces_heads_every_time() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    session.ingest(TiltSample::new(8.0, 0.0));

    for _ in 0..20 {
        let ticket = session.request_flip().unwrap();
        let outcome = session.settle(ticket).unwrap();
        assert!(outcome.heads);
        assert_eq!(session.status().label(), LABEL_HEADS);
    }
    assert_eq!(recorder.played(), vec![HapticPattern::ShortPulse]);
}

#[test]
fn test_tails_tilt_forces_tails_every_time() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    session.ingest(TiltSample::new(-8.0, 0.0));

    for _ in 0..20 {
        let ticket = session.request_flip().unwrap();
        assert!(!session.settle(ticket).unwrap().heads);
    }
}

#[test]
fn test_outcome_fixed_at_request_time() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    session.ingest(TiltSample::new(8.0, 0.0));

    let ticket = session.request_flip().unwrap();
    // Tilting mid-flip re-arms for the next flip, not this one
    session.ingest(TiltSample::new(-8.0, 0.0));
    let outcome = session.settle(ticket).unwrap();
    assert!(outcome.heads);

    let ticket = session.request_flip().unwrap();
    assert!(!session.settle(ticket).unwrap().heads);
}

// =============================================================================
// STEALTH
// =============================================================================

#[test]
fn test_stealth_is_fair_and_silent() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    session.toggle_stealth();

    let mut heads = 0;
    let trials = 2000;
    for i in 0..trials {
        // Hard tilt to heads the whole time
        let x = if i % 2 == 0 { 9.0 } else { 12.0 };
        session.ingest(TiltSample::new(x, 0.0));
        assert_eq!(session.controller().cheat_mode(), CheatMode::Random);

        let ticket = session.request_flip().unwrap();
        if session.settle(ticket).unwrap().heads {
            heads += 1;
        }
    }

    assert_eq!(recorder.count(), 0);
    let freq = heads as f64 / trials as f64;
    assert!((freq - 0.5).abs() < 0.06, "heads frequency {}", freq);
}

#[test]
fn test_entering_stealth_clears_armed_bias() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, FlipConfig {
        random_policy: RandomPolicy::Alternate,
        ..FlipConfig::default()
    });
    session.ingest(TiltSample::new(8.0, 0.0));
    assert_eq!(session.controller().cheat_mode(), CheatMode::Heads);

    session.toggle_stealth();
    // Alternate policy from heads → tails, proving the HEADS bias is gone
    let ticket = session.request_flip().unwrap();
    assert!(!session.settle(ticket).unwrap().heads);
}

#[test]
fn test_leaving_stealth_pulses_on_next_tilt() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    session.ingest(TiltSample::new(8.0, 0.0));
    session.toggle_stealth();
    session.toggle_stealth();

    // Still tilted: haptic memory was reset, so HEADS confirms again
    session.ingest(TiltSample::new(8.0, 0.0));
    assert_eq!(
        recorder.played(),
        vec![HapticPattern::ShortPulse, HapticPattern::ShortPulse]
    );
}

#[test]
fn test_stealth_message_then_expire() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    let notice = session.toggle_stealth();
    assert_eq!(session.status().label(), STEALTH_ACTIVE_TEXT);
    session.expire_stealth_message(notice.seq);
    assert_eq!(session.status().label(), LABEL_IDLE);
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn test_reentrant_flip_no_state_change() {
    let recorder = RecordingHaptics::new();
    let mut session = started(&recorder, seeded());
    let ticket = session.request_flip().unwrap();
    let rotation = session.rotation();
    let count = session.controller().flip_count();

    assert!(session.request_flip().is_none());
    assert_eq!(session.rotation(), rotation);
    assert_eq!(session.controller().flip_count(), count);
    assert_eq!(session.status(), &FlipStatus::Flipping);
    assert_eq!(session.status().label(), LABEL_FLIPPING);

    session.settle(ticket).unwrap();
    assert!(!session.is_flipping());
}

#[test]
fn test_no_sensor_stays_random_and_still() {
    let mut session = FlipSession::new(FlipConfig::default(), Box::new(NoHaptics));
    session.start();
    assert_eq!(session.controller().cheat_mode(), CheatMode::Random);
    assert_eq!(session.offset(), fairflip::types::Offset::ZERO);
    let ticket = session.request_flip().unwrap();
    assert!(session.settle(ticket).is_some());
}

#[test]
fn test_stopped_handle_ignores_scripted_source() {
    let recorder = RecordingHaptics::new();
    let handle = SessionHandle::new(FlipConfig::default(), Box::new(recorder.clone()));
    // Never started
    let mut source = ScriptedTiltSource::from_x(&[9.0, -9.0]);
    let mut outputs = handle.attach(&mut source);
    assert!(outputs.try_recv().is_err());
    assert_eq!(recorder.count(), 0);
    assert_eq!(handle.lock().filter().sample_count(), 0);
}

#[test]
fn test_attach_forwards_outputs() {
    let recorder = RecordingHaptics::new();
    let handle = SessionHandle::new(
        FlipConfig {
            filter: fairflip::FilterConfig {
                tilt_threshold: 5.0,
                ..Default::default()
            },
            ..FlipConfig::default()
        },
        Box::new(recorder.clone()),
    );
    handle.start();

    let mut source = ScriptedTiltSource::from_x(&[0.0, 6.0, 6.0, -6.0, 0.0]);
    let mut outputs = handle.attach(&mut source);

    let mut haptic_at = Vec::new();
    let mut i = 0;
    while let Ok(output) = outputs.try_recv() {
        if output.haptic.is_some() {
            haptic_at.push(i);
        }
        i += 1;
    }
    assert_eq!(i, 5);
    assert_eq!(haptic_at, vec![1, 3]);
    assert_eq!(recorder.count(), 2);
}
