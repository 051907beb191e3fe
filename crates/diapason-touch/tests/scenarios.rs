//! Playing scenarios for the touch arbiter.
//!
//! Each test drives the arbiter with electrode transitions and sweeps the
//! way the control loop does, and checks the exact note stream produced.

use diapason_touch::{NoteEvent, PlayingMode, Position, TimingParams, TouchArbiter, Tuning};

const T: u64 = 1000;

fn e(string: u8, fret: u8) -> u8 {
    Position::new(string, fret).unwrap().electrode(false)
}

fn on(string: u8, note: u8) -> NoteEvent {
    NoteEvent::On { string, note }
}

fn off(string: u8, note: u8) -> NoteEvent {
    NoteEvent::Off { string, note }
}

fn strum_mode() -> (TouchArbiter, Vec<NoteEvent>) {
    let mut arbiter = TouchArbiter::default();
    let mut log = Vec::new();
    arbiter.set_playing_mode(PlayingMode::Strum, &mut log);
    (arbiter, log)
}

fn offs(log: &[NoteEvent]) -> usize {
    log.iter().filter(|ev| matches!(ev, NoteEvent::Off { .. })).count()
}

// ---------------------------------------------------------------------------
// Tapping
// ---------------------------------------------------------------------------

#[test]
fn tapping_touch_and_release() {
    let mut arbiter = TouchArbiter::default();
    let mut log = Vec::new();

    arbiter.touch_on(e(0, 2), T, &mut log);
    assert_eq!(log, [on(0, 57)]);

    arbiter.touch_off(e(0, 2), T + 100, &mut log);
    assert_eq!(log, [on(0, 57), off(0, 57)]);
}

#[test]
fn tapping_release_is_never_debounced() {
    let mut arbiter = TouchArbiter::default();
    let mut log = Vec::new();
    arbiter.touch_on(e(3, 1), T, &mut log);
    arbiter.touch_off(e(3, 1), T + 5, &mut log);
    assert_eq!(log, [on(3, 41), off(3, 41)]);
}

#[test]
fn tapping_capo_shifts_notes() {
    let mut arbiter = TouchArbiter::new(Tuning::new([60, 50, 45, 40], -2), TimingParams::default());
    let mut log = Vec::new();
    arbiter.touch_on(e(0, 4), T, &mut log);
    assert_eq!(log, [on(0, 62)]);
}

// ---------------------------------------------------------------------------
// Hammer-on
// ---------------------------------------------------------------------------

#[test]
fn hammer_on_within_post_strum_window() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(1, 3), T - 10, &mut log);
    arbiter.touch_on(e(1, 5), T, &mut log);
    assert_eq!(log, [on(1, 54)]);

    arbiter.touch_on(e(1, 4), T + 20, &mut log);
    assert_eq!(log, [on(1, 54), off(1, 54), on(1, 55)]);
    assert_eq!(arbiter.sounding(1), Some(55));
}

#[test]
fn no_hammer_on_after_window() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(1, 3), T - 10, &mut log);
    arbiter.touch_on(e(1, 5), T, &mut log);
    arbiter.touch_on(e(1, 4), T + 31, &mut log);
    assert_eq!(log, [on(1, 54)]);

    // the next strum picks the higher fret
    arbiter.touch_off(e(1, 5), T + 60, &mut log);
    arbiter.touch_on(e(1, 5), T + 100, &mut log);
    assert_eq!(log.last(), Some(&on(1, 55)));
}

#[test]
fn quick_release_after_hammer_on_stops_note() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(1, 5), T, &mut log);
    arbiter.touch_off(e(1, 5), T + 10, &mut log);
    arbiter.touch_on(e(1, 4), T + 20, &mut log);
    assert_eq!(arbiter.sounding(1), Some(55));

    // inside the debounce window, but it releases the sounding note
    arbiter.touch_off(e(1, 4), T + 30, &mut log);
    assert!(!arbiter.fret_state(Position::new(1, 4).unwrap()).touched);

    for now in [T + 100, T + 6000, T + 61_000] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(log, [on(1, 50), off(1, 50), on(1, 55), off(1, 55)]);
    assert_eq!(arbiter.sounding(1), None);
}

#[test]
fn hammer_on_above_note_range_keeps_open_string() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.set_tuning(Tuning::new([127, 50, 45, 40], 0), &mut log);

    arbiter.touch_on(e(0, 5), T, &mut log);
    arbiter.touch_on(e(0, 1), T + 10, &mut log);
    assert_eq!(log, [on(0, 127)]);
    assert_eq!(arbiter.sounding(0), Some(127));
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

#[test]
fn debounced_release_lands_on_next_sweep() {
    let (mut arbiter, mut log) = strum_mode();
    let fret = Position::new(0, 2).unwrap();

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_off(e(0, 2), T + 5, &mut log);
    arbiter.sweep(T + 10, &mut log);
    assert!(arbiter.fret_state(fret).touched);

    arbiter.sweep(T + 20, &mut log);
    assert!(!arbiter.fret_state(fret).touched);

    // the strum no longer sees fret 2
    arbiter.touch_on(e(0, 5), T + 500, &mut log);
    assert_eq!(log, [on(0, 55)]);
}

#[test]
fn bounce_back_to_held_is_dropped() {
    let (mut arbiter, mut log) = strum_mode();
    let fret = Position::new(0, 2).unwrap();

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_off(e(0, 2), T + 5, &mut log);
    arbiter.touch_on(e(0, 2), T + 8, &mut log);
    arbiter.sweep(T + 100, &mut log);
    assert!(arbiter.fret_state(fret).touched);

    arbiter.touch_on(e(0, 5), T + 200, &mut log);
    assert_eq!(log, [on(0, 58)]);
}

// ---------------------------------------------------------------------------
// Release tolerance
// ---------------------------------------------------------------------------

#[test]
fn strum_within_tolerance_uses_released_fret() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 5), T + 150, &mut log);
    assert_eq!(log, [on(0, 58)]);

    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    arbiter.touch_on(e(0, 5), T + 210, &mut log);

    assert_eq!(log, [on(0, 58), on(0, 58)]);
    assert_eq!(arbiter.sounding(0), Some(58));
    assert!(!arbiter.string_state(0).unwrap().is_open);
    // the tolerated release is consumed by the strum
    assert_eq!(arbiter.fret_state(Position::new(0, 2).unwrap()).release_time, None);
}

#[test]
fn strum_within_tolerance_without_release_delay() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.timing_mut().set_release_delay_ms(0);

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 5), T + 150, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    assert_eq!(log, [on(0, 58), off(0, 58)]);

    arbiter.touch_on(e(0, 5), T + 210, &mut log);
    assert_eq!(log.last(), Some(&on(0, 58)));
}

#[test]
fn strum_after_tolerance_plays_open_string() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 5), T + 150, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    arbiter.touch_on(e(0, 5), T + 230, &mut log);

    assert_eq!(log, [on(0, 58), off(0, 58), on(0, 55)]);
    assert!(arbiter.string_state(0).unwrap().is_open);
}

// ---------------------------------------------------------------------------
// Open-string sustain
// ---------------------------------------------------------------------------

#[test]
fn open_string_sustains_then_stops_once() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(2, 5), T, &mut log);
    arbiter.touch_off(e(2, 5), T + 100, &mut log);
    assert_eq!(log, [on(2, 45)]);

    for now in [T + 200, T + 1000, T + 3099] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(log, [on(2, 45)]);
    assert_eq!(arbiter.sounding(2), Some(45));

    arbiter.sweep(T + 3100, &mut log);
    assert_eq!(log, [on(2, 45), off(2, 45)]);

    for now in [T + 3200, T + 10_000] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(offs(&log), 1);
}

#[test]
fn restrum_restarts_open_sustain() {
    let (mut arbiter, mut log) = strum_mode();

    arbiter.touch_on(e(2, 5), T, &mut log);
    arbiter.touch_off(e(2, 5), T + 100, &mut log);
    arbiter.touch_on(e(2, 5), T + 2000, &mut log);
    arbiter.touch_off(e(2, 5), T + 2100, &mut log);

    arbiter.sweep(T + 3100, &mut log);
    assert_eq!(offs(&log), 0);
    arbiter.sweep(T + 5100, &mut log);
    assert_eq!(log, [on(2, 45), on(2, 45), off(2, 45)]);
}

#[test]
fn held_strum_keeps_open_string_ringing() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.touch_on(e(3, 5), T, &mut log);
    arbiter.sweep(T + 10_000, &mut log);
    assert_eq!(log, [on(3, 40)]);
}

// ---------------------------------------------------------------------------
// Delayed release
// ---------------------------------------------------------------------------

fn sounding_fret_with_strum_held() -> (TouchArbiter, Vec<NoteEvent>) {
    let (mut arbiter, mut log) = strum_mode();
    assert_eq!(arbiter.timing().release_delay_ms(), 50);
    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    (arbiter, log)
}

#[test]
fn delayed_release_fires_after_delay() {
    let (mut arbiter, mut log) = sounding_fret_with_strum_held();
    assert_eq!(log, [on(0, 58)]);

    arbiter.sweep(T + 230, &mut log);
    arbiter.sweep(T + 249, &mut log);
    assert_eq!(log, [on(0, 58)]);

    arbiter.sweep(T + 250, &mut log);
    assert_eq!(log, [on(0, 58), off(0, 58)]);

    arbiter.sweep(T + 400, &mut log);
    assert_eq!(offs(&log), 1);
}

#[test]
fn retouch_cancels_delayed_release() {
    let (mut arbiter, mut log) = sounding_fret_with_strum_held();

    arbiter.touch_on(e(0, 2), T + 230, &mut log);
    for now in [T + 250, T + 300, T + 2000] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(log, [on(0, 58)]);
    assert_eq!(arbiter.sounding(0), Some(58));
}

#[test]
fn zero_delay_stops_at_release() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.timing_mut().set_release_delay_ms(0);
    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    assert_eq!(log, [on(0, 58), off(0, 58)]);
}

/// Low pitch plus a full negative capo clamps every fret to note 0, so
/// frets 1 and 2 both strum MIDI note 1.
fn unison_tuning() -> Tuning {
    Tuning::new([10, 50, 45, 40], -24)
}

#[test]
fn same_note_alternate_prevents_delayed_release() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.set_tuning(unison_tuning(), &mut log);

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_on(e(0, 1), T + 150, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);

    assert_eq!(arbiter.fret_state(Position::new(0, 2).unwrap()).release_delay_since, None);
    for now in [T + 260, T + 1000] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(log, [on(0, 1)]);
}

#[test]
fn alternate_touch_within_window_cancels_delay() {
    let (mut arbiter, mut log) = strum_mode();
    arbiter.set_tuning(unison_tuning(), &mut log);

    arbiter.touch_on(e(0, 2), T, &mut log);
    arbiter.touch_on(e(0, 5), T + 100, &mut log);
    arbiter.touch_off(e(0, 2), T + 200, &mut log);
    assert_eq!(arbiter.fret_state(Position::new(0, 2).unwrap()).release_delay_since, Some(T + 200));

    arbiter.touch_on(e(0, 1), T + 220, &mut log);
    assert_eq!(arbiter.fret_state(Position::new(0, 2).unwrap()).release_delay_since, None);

    for now in [T + 250, T + 1000] {
        arbiter.sweep(now, &mut log);
    }
    assert_eq!(log, [on(0, 1)]);
}
