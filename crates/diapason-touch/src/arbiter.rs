//! Touch arbitration: electrode transitions in, note decisions out.
//!
//! [`TouchArbiter`] owns every piece of per-string and per-fret state. It
//! is driven by three calls, all taking the pass time `now` in
//! milliseconds:
//!
//! - [`touch_on`](TouchArbiter::touch_on) / [`touch_off`](TouchArbiter::touch_off)
//!   for each electrode edge
//! - [`sweep`](TouchArbiter::sweep) once per pass, before the edges
//!
//! An edge arriving within [`DEBOUNCE_MS`] of the previous accepted edge on
//! its electrode is held back rather than lost: the sweep applies it once
//! the window has passed, unless a later edge returned the electrode to
//! its accepted level first.
//!
//! # Playing Modes
//!
//! **Tapping**: every fret is a key. Touch plays `note(string, fret)`,
//! release stops it.
//!
//! **Strum**: fret columns 0..5 select pitch and column 5 triggers. A
//! strum sounds `1 + note(string, fret)` for the best live fret (see
//! [`snapshot`](crate::snapshot)) or the open string `note(string, 0)`.
//! Fret touches shortly after a strum sound on their own (hammer-on).
//! Releasing a sounding fret can be delayed by
//! [`TimingParams::release_delay_ms`], and open strings ring for
//! [`OPEN_STRING_SUSTAIN_MS`] after the strum is let go.
//!
//! # Example
//!
//! ```rust
//! use diapason_touch::{NoteEvent, Position, TouchArbiter};
//!
//! let mut arbiter = TouchArbiter::default();
//! let mut log: Vec<NoteEvent> = Vec::new();
//! let electrode = Position::new(0, 2).unwrap().electrode(false);
//!
//! arbiter.touch_on(electrode, 1000, &mut log);
//! arbiter.touch_off(electrode, 1100, &mut log);
//! assert_eq!(
//!     log,
//!     [NoteEvent::On { string: 0, note: 57 }, NoteEvent::Off { string: 0, note: 57 }]
//! );
//! ```

use crate::fretboard::{ELECTRODES, FRETS, MAX_NOTE, Position, REGULAR_FRETS, STRINGS, STRUM_FRET, Tuning};
use crate::sink::NoteSink;
use crate::snapshot::{FretState, best_fret};
use crate::timing::{DEBOUNCE_MS, OPEN_STRING_SUSTAIN_MS, TimingParams};

const STRUM: usize = STRUM_FRET as usize;

/// How the fretboard turns touches into notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlayingMode {
    /// Every fret is a key.
    #[default]
    Tapping,
    /// Frets select pitch, the last column strums.
    Strum,
}

/// Playback bookkeeping for one string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringState {
    /// Note currently sounding.
    pub playing: Option<u8>,
    /// The sounding note came from an open-string strum.
    pub is_open: bool,
    /// Time of the last strum on this string.
    pub last_strum: Option<u64>,
    /// Strum release that started the open-string sustain timer.
    pub open_release: Option<u64>,
}

/// The fret-touch-to-note decision engine.
#[derive(Debug, Clone)]
pub struct TouchArbiter {
    mode: PlayingMode,
    left_handed: bool,
    tuning: Tuning,
    timing: TimingParams,
    frets: [[FretState; FRETS]; STRINGS],
    strings: [StringState; STRINGS],
    last_transition: [Option<u64>; ELECTRODES],
    held_back: [Option<bool>; ELECTRODES],
}

impl Default for TouchArbiter {
    fn default() -> Self {
        Self::new(Tuning::standard(), TimingParams::default())
    }
}

impl TouchArbiter {
    /// Idle arbiter in tapping mode, right-handed.
    pub fn new(tuning: Tuning, timing: TimingParams) -> Self {
        Self {
            mode: PlayingMode::default(),
            left_handed: false,
            tuning,
            timing,
            frets: [[FretState::default(); FRETS]; STRINGS],
            strings: [StringState::default(); STRINGS],
            last_transition: [None; ELECTRODES],
            held_back: [None; ELECTRODES],
        }
    }

    /// Current playing mode.
    pub fn mode(&self) -> PlayingMode {
        self.mode
    }

    /// Switches playing mode. Every sounding note is stopped first and the
    /// strum, release and sustain records are dropped; held frets stay held.
    pub fn set_playing_mode<S: NoteSink>(&mut self, mode: PlayingMode, sink: &mut S) {
        if mode == self.mode {
            return;
        }
        self.all_notes_off(sink);
        for string in &mut self.frets {
            for fret in string.iter_mut() {
                *fret = FretState {
                    touched: fret.touched,
                    ..FretState::default()
                };
            }
        }
        for string in &mut self.strings {
            *string = StringState::default();
        }
        self.mode = mode;
        #[cfg(feature = "tracing")]
        tracing::debug!(?mode, "playing mode changed");
    }

    /// Whether strings are mirrored.
    pub fn left_handed(&self) -> bool {
        self.left_handed
    }

    /// Mirrors the string order. Stops every note and forgets all touch
    /// state, since held electrodes now map to other cells.
    pub fn set_left_handed<S: NoteSink>(&mut self, left_handed: bool, sink: &mut S) {
        if left_handed == self.left_handed {
            return;
        }
        self.all_notes_off(sink);
        self.frets = [[FretState::default(); FRETS]; STRINGS];
        self.strings = [StringState::default(); STRINGS];
        self.held_back = [None; ELECTRODES];
        self.left_handed = left_handed;
    }

    /// Current tuning.
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Replaces the tuning, stopping sounding notes so no note-off is sent
    /// for a pitch that was never started.
    pub fn set_tuning<S: NoteSink>(&mut self, tuning: Tuning, sink: &mut S) {
        if tuning == self.tuning {
            return;
        }
        self.all_notes_off(sink);
        self.tuning = tuning;
    }

    /// Current timing windows.
    pub fn timing(&self) -> &TimingParams {
        &self.timing
    }

    /// Mutable timing windows; setters clamp.
    pub fn timing_mut(&mut self) -> &mut TimingParams {
        &mut self.timing
    }

    /// Playback state of `string`.
    pub fn string_state(&self, string: u8) -> Option<&StringState> {
        self.strings.get(string as usize)
    }

    /// Touch state of one cell.
    pub fn fret_state(&self, position: Position) -> FretState {
        self.frets[position.string as usize][position.fret as usize]
    }

    /// Note sounding on `string`.
    pub fn sounding(&self, string: u8) -> Option<u8> {
        self.string_state(string).and_then(|s| s.playing)
    }

    /// Stops every sounding note and cancels pending timers.
    pub fn all_notes_off<S: NoteSink>(&mut self, sink: &mut S) {
        for string in 0..STRINGS {
            self.stop(string, sink);
            for fret in &mut self.frets[string] {
                fret.release_delay_since = None;
            }
        }
    }

    /// Handles an electrode becoming touched.
    pub fn touch_on<S: NoteSink>(&mut self, electrode: u8, now: u64, sink: &mut S) {
        let Some(position) = Position::from_electrode(electrode, self.left_handed) else {
            return;
        };
        let (string, fret) = (position.string as usize, position.fret as usize);
        if self.debounced(electrode, now) {
            #[cfg(feature = "tracing")]
            tracing::trace!(electrode, now, "touch on debounced");
            self.hold_back(electrode, self.frets[string][fret].touched, true);
            return;
        }
        self.accept(electrode, now);

        let state = &mut self.frets[string][fret];
        state.touched = true;
        state.touch_time = Some(now);

        match self.mode {
            PlayingMode::Tapping => {
                let note = self.tuning.note(position.string, position.fret);
                self.play(string, note, false, sink);
            }
            PlayingMode::Strum if position.is_strum() => self.strum(string, now, sink),
            PlayingMode::Strum => {
                self.claim_fret(string, fret, now);
                self.fret_touched(string, fret, now, sink);
            }
        }
    }

    /// Handles an electrode being let go.
    pub fn touch_off<S: NoteSink>(&mut self, electrode: u8, now: u64, sink: &mut S) {
        let Some(position) = Position::from_electrode(electrode, self.left_handed) else {
            return;
        };
        let (string, fret) = (position.string as usize, position.fret as usize);

        let must_flush = match self.mode {
            PlayingMode::Tapping => true,
            PlayingMode::Strum if position.is_strum() => self.strings[string].playing.is_some(),
            PlayingMode::Strum => {
                self.sounding_fretted(string) == Some(self.fretted_note(string, fret))
            }
        };
        if self.debounced(electrode, now) && !must_flush {
            #[cfg(feature = "tracing")]
            tracing::trace!(electrode, now, "touch off debounced");
            self.hold_back(electrode, self.frets[string][fret].touched, false);
            return;
        }
        self.accept(electrode, now);

        match self.mode {
            PlayingMode::Tapping => self.tap_released(string, fret, sink),
            PlayingMode::Strum if position.is_strum() => self.strum_released(string, now, sink),
            PlayingMode::Strum => self.fret_released(string, fret, now, sink),
        }
    }

    /// Expires open-string sustains and delayed note-offs, then stops notes
    /// nothing on their string is holding any more. Run once per pass
    /// before feeding edges.
    ///
    /// Edges held back by the debounce are applied first, at `now`.
    pub fn sweep<S: NoteSink>(&mut self, now: u64, sink: &mut S) {
        for electrode in 0..ELECTRODES as u8 {
            if self.debounced(electrode, now) {
                continue;
            }
            match self.held_back[electrode as usize] {
                Some(true) => self.touch_on(electrode, now, sink),
                Some(false) => self.touch_off(electrode, now, sink),
                None => {}
            }
        }

        let delay = self.timing.release_delay_ms();
        for string in 0..STRINGS {
            let state = self.strings[string];
            if state.is_open
                && state.playing.is_some()
                && state
                    .open_release
                    .is_some_and(|at| now.saturating_sub(at) >= OPEN_STRING_SUSTAIN_MS)
            {
                self.stop(string, sink);
            }

            if delay > 0 {
                for fret in 0..REGULAR_FRETS {
                    let Some(since) = self.frets[string][fret].release_delay_since else {
                        continue;
                    };
                    if now.saturating_sub(since) < delay {
                        continue;
                    }
                    let note = self.fretted_note(string, fret);
                    if self.sounding_fretted(string) == Some(note)
                        && !self.same_note_available(string, fret, note, now)
                    {
                        self.stop(string, sink);
                    }
                    self.frets[string][fret].release_delay_since = None;
                }
            }

            self.release_orphan(string, now, sink);
        }
    }

    fn debounced(&self, electrode: u8, now: u64) -> bool {
        self.last_transition[electrode as usize]
            .is_some_and(|last| now.saturating_sub(last) < DEBOUNCE_MS)
    }

    fn accept(&mut self, electrode: u8, now: u64) {
        self.last_transition[electrode as usize] = Some(now);
        self.held_back[electrode as usize] = None;
    }

    /// Remembers a suppressed edge. A bounce back to the accepted level
    /// cancels it.
    fn hold_back(&mut self, electrode: u8, accepted: bool, touched: bool) {
        self.held_back[electrode as usize] = (touched != accepted).then_some(touched);
    }

    fn fretted_note(&self, string: usize, fret: usize) -> u8 {
        1 + self.tuning.note(string as u8, fret as u8)
    }

    fn open_note(&self, string: usize) -> u8 {
        self.tuning.note(string as u8, 0)
    }

    fn sounding_fretted(&self, string: usize) -> Option<u8> {
        let state = &self.strings[string];
        if state.is_open { None } else { state.playing }
    }

    fn any_regular_touched(&self, string: usize) -> bool {
        self.frets[string][..REGULAR_FRETS].iter().any(|f| f.touched)
    }

    fn any_touched(&self, string: usize) -> bool {
        self.frets[string].iter().any(|f| f.touched)
    }

    fn any_in_tolerance(&self, string: usize, now: u64) -> bool {
        self.frets[string][..REGULAR_FRETS].iter().any(|f| f.in_tolerance(now))
    }

    fn same_note_available(&self, string: usize, released: usize, note: u8, now: u64) -> bool {
        (0..REGULAR_FRETS).any(|fret| {
            let state = &self.frets[string][fret];
            fret != released
                && (state.touched || state.in_tolerance(now))
                && self.fretted_note(string, fret) == note
        })
    }

    fn play<S: NoteSink>(&mut self, string: usize, note: u8, is_open: bool, sink: &mut S) {
        if note > MAX_NOTE {
            return;
        }
        let state = &mut self.strings[string];
        if let Some(old) = state.playing.filter(|&old| old != note) {
            sink.note_off(string as u8, old);
        }
        sink.note_on(string as u8, note);
        state.playing = Some(note);
        state.is_open = is_open;
        #[cfg(feature = "tracing")]
        tracing::trace!(string, note, is_open, "note on");
    }

    fn stop<S: NoteSink>(&mut self, string: usize, sink: &mut S) {
        let state = &mut self.strings[string];
        if let Some(note) = state.playing.take() {
            sink.note_off(string as u8, note);
            state.is_open = false;
            state.open_release = None;
            #[cfg(feature = "tracing")]
            tracing::trace!(string, note, "note off");
        }
    }

    /// Resets the touched fret's records and prunes its neighbours'.
    fn claim_fret(&mut self, string: usize, fret: usize, now: u64) {
        let delay = self.timing.release_delay_ms();
        let frets = &mut self.frets[string];
        frets[fret].release_time = None;
        frets[fret].release_delay_since = None;

        for (other, state) in frets[..REGULAR_FRETS].iter_mut().enumerate() {
            if other == fret {
                continue;
            }
            if delay > 0
                && state
                    .release_delay_since
                    .is_some_and(|since| now.saturating_sub(since) < delay)
            {
                state.release_delay_since = None;
            }
            if state.touched && !state.in_tolerance(now) {
                state.release_time = None;
            }
        }
    }

    fn fret_touched<S: NoteSink>(&mut self, string: usize, fret: usize, now: u64, sink: &mut S) {
        let state = self.strings[string];
        let post_strum = self.timing.post_strum_threshold_ms();
        let note = self.fretted_note(string, fret);
        if note <= MAX_NOTE
            && state
                .last_strum
                .is_some_and(|at| now.saturating_sub(at) <= post_strum)
        {
            self.stop(string, sink);
            self.play(string, note, false, sink);
            #[cfg(feature = "tracing")]
            tracing::trace!(string, fret, "hammer-on");
        } else if state.playing.is_some() && state.is_open && !self.frets[string][STRUM].touched {
            self.stop(string, sink);
        }
    }

    fn strum<S: NoteSink>(&mut self, string: usize, now: u64, sink: &mut S) {
        self.strings[string].last_strum = Some(now);

        match best_fret(&mut self.frets[string], now, &self.timing) {
            Some((fret, _)) => {
                let fret = fret as usize;
                let note = self.fretted_note(string, fret);
                self.play(string, note, false, sink);
                if !self.frets[string][fret].touched {
                    self.frets[string][fret].release_time = None;
                }
            }
            None => {
                let note = self.open_note(string);
                self.play(string, note, true, sink);
            }
        }

        for state in &mut self.frets[string] {
            state.release_delay_since = None;
        }
        self.strings[string].open_release = None;
    }

    fn strum_released<S: NoteSink>(&mut self, string: usize, now: u64, sink: &mut S) {
        self.frets[string][STRUM].touched = false;

        if self.any_regular_touched(string) || self.any_in_tolerance(string, now) {
            return;
        }
        let state = &mut self.strings[string];
        if state.playing.is_some() {
            if state.is_open {
                state.open_release = Some(now);
            } else {
                self.stop(string, sink);
            }
        }
    }

    fn fret_released<S: NoteSink>(&mut self, string: usize, fret: usize, now: u64, sink: &mut S) {
        {
            let frets = &mut self.frets[string];
            frets[fret].release_time = Some(now);
            frets[fret].touch_time = None;
            for (other, state) in frets[..REGULAR_FRETS].iter_mut().enumerate() {
                if other != fret && state.touched {
                    state.release_time = None;
                    state.release_delay_since = None;
                }
            }
            frets[fret].touched = false;
        }

        let note = self.fretted_note(string, fret);
        if self.sounding_fretted(string) == Some(note)
            && !self.same_note_available(string, fret, note, now)
        {
            if self.timing.release_delay_ms() > 0 {
                self.frets[string][fret].release_delay_since = Some(now);
            } else {
                self.stop(string, sink);
            }
        }

        if !self.any_touched(string)
            && !self.any_in_tolerance(string, now)
            && self.strings[string].playing.is_some()
        {
            self.stop(string, sink);
        }
    }

    fn tap_released<S: NoteSink>(&mut self, string: usize, fret: usize, sink: &mut S) {
        self.frets[string][fret].touched = false;
        let note = self.tuning.note(string as u8, fret as u8);
        if self.strings[string].playing == Some(note) {
            self.stop(string, sink);
        } else {
            sink.note_off(string as u8, note);
        }
    }

    /// Handles a note left sounding with nothing on its string holding it:
    /// no fret held, none in release tolerance, no delayed note-off that
    /// can still fire. Fretted notes stop; open strings start their sustain.
    fn release_orphan<S: NoteSink>(&mut self, string: usize, now: u64, sink: &mut S) {
        let state = self.strings[string];
        if state.playing.is_none() || state.open_release.is_some() {
            return;
        }
        let delay_pending = self.timing.release_delay_ms() > 0
            && self.frets[string]
                .iter()
                .any(|f| f.release_delay_since.is_some());
        if self.any_touched(string) || self.any_in_tolerance(string, now) || delay_pending {
            return;
        }
        if state.is_open {
            self.strings[string].open_release = Some(now);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(string, "stopping note with no fret holding it");
            self.stop(string, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NoteEvent;

    fn electrode(string: u8, fret: u8) -> u8 {
        Position::new(string, fret).unwrap().electrode(false)
    }

    fn strum_arbiter() -> (TouchArbiter, Vec<NoteEvent>) {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.set_playing_mode(PlayingMode::Strum, &mut log);
        (arbiter, log)
    }

    #[test]
    fn test_invalid_electrode_ignored() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.touch_on(24, 1000, &mut log);
        arbiter.touch_off(200, 1100, &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_first_transition_not_debounced() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.touch_on(electrode(1, 1), 0, &mut log);
        assert_eq!(log, [NoteEvent::On { string: 1, note: 51 }]);
    }

    #[test]
    fn test_touch_on_debounce() {
        let (mut arbiter, mut log) = strum_arbiter();
        let e = electrode(2, 5);
        arbiter.touch_on(e, 1000, &mut log);
        arbiter.touch_off(e, 1010, &mut log);
        // strum release with a note sounding is never debounced
        assert_eq!(arbiter.sounding(2), Some(45));
        assert_eq!(arbiter.string_state(2).unwrap().open_release, Some(1010));
        log.clear();
        arbiter.touch_on(e, 1025, &mut log);
        assert!(log.is_empty());
        arbiter.touch_on(e, 1030, &mut log);
        assert_eq!(log, [NoteEvent::On { string: 2, note: 45 }]);
    }

    #[test]
    fn test_regular_release_debounced() {
        let (mut arbiter, mut log) = strum_arbiter();
        let e = electrode(0, 1);
        arbiter.touch_on(e, 1000, &mut log);
        arbiter.touch_off(e, 1005, &mut log);
        assert!(arbiter.fret_state(Position::new(0, 1).unwrap()).touched);
        assert_eq!(arbiter.held_back[e as usize], Some(false));

        arbiter.sweep(1025, &mut log);
        assert!(!arbiter.fret_state(Position::new(0, 1).unwrap()).touched);
        assert_eq!(arbiter.held_back[e as usize], None);
    }

    #[test]
    fn test_tapping_replaces_note() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.touch_on(electrode(0, 1), 1000, &mut log);
        arbiter.touch_on(electrode(0, 3), 1100, &mut log);
        arbiter.touch_off(electrode(0, 1), 1200, &mut log);
        arbiter.touch_off(electrode(0, 3), 1300, &mut log);
        assert_eq!(
            log,
            [
                NoteEvent::On { string: 0, note: 56 },
                NoteEvent::Off { string: 0, note: 56 },
                NoteEvent::On { string: 0, note: 58 },
                NoteEvent::Off { string: 0, note: 56 },
                NoteEvent::Off { string: 0, note: 58 },
            ]
        );
        assert_eq!(arbiter.sounding(0), None);
    }

    #[test]
    fn test_strum_plays_highest_held_fret() {
        let (mut arbiter, mut log) = strum_arbiter();
        arbiter.touch_on(electrode(3, 1), 1000, &mut log);
        arbiter.touch_on(electrode(3, 4), 1000, &mut log);
        arbiter.touch_on(electrode(3, 5), 1100, &mut log);
        assert_eq!(log, [NoteEvent::On { string: 3, note: 45 }]);
    }

    #[test]
    fn test_strum_open_string() {
        let (mut arbiter, mut log) = strum_arbiter();
        arbiter.touch_on(electrode(1, 5), 1000, &mut log);
        assert_eq!(log, [NoteEvent::On { string: 1, note: 50 }]);
        assert!(arbiter.string_state(1).unwrap().is_open);
    }

    #[test]
    fn test_fret_touch_damps_open_string() {
        let (mut arbiter, mut log) = strum_arbiter();
        arbiter.touch_on(electrode(1, 5), 1000, &mut log);
        arbiter.touch_off(electrode(1, 5), 1100, &mut log);
        arbiter.touch_on(electrode(1, 2), 1200, &mut log);
        assert_eq!(log.last(), Some(&NoteEvent::Off { string: 1, note: 50 }));
        assert_eq!(arbiter.sounding(1), None);
    }

    #[test]
    fn test_fretted_release_after_strum_release_stops() {
        let (mut arbiter, mut log) = strum_arbiter();
        arbiter.timing_mut().set_release_delay_ms(0);
        arbiter.touch_on(electrode(0, 2), 1000, &mut log);
        arbiter.touch_on(electrode(0, 5), 1100, &mut log);
        arbiter.touch_off(electrode(0, 5), 1200, &mut log);
        assert_eq!(arbiter.sounding(0), Some(58));
        arbiter.touch_off(electrode(0, 2), 1300, &mut log);
        assert_eq!(log.last(), Some(&NoteEvent::Off { string: 0, note: 58 }));
    }

    #[test]
    fn test_mode_switch_flushes() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.touch_on(electrode(2, 2), 1000, &mut log);
        arbiter.touch_on(electrode(3, 0), 1000, &mut log);
        arbiter.set_playing_mode(PlayingMode::Strum, &mut log);
        assert_eq!(arbiter.sounding(2), None);
        assert_eq!(arbiter.sounding(3), None);
        assert_eq!(log.iter().filter(|e| matches!(e, NoteEvent::Off { .. })).count(), 2);
        assert!(arbiter.fret_state(Position::new(2, 2).unwrap()).touched);
        assert_eq!(arbiter.fret_state(Position::new(2, 2).unwrap()).touch_time, None);
    }

    #[test]
    fn test_left_handed_mirrors_notes() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.set_left_handed(true, &mut log);
        // electrode 12 is string 0 fret 0 right-handed
        arbiter.touch_on(12, 1000, &mut log);
        assert_eq!(log, [NoteEvent::On { string: 3, note: 40 }]);
    }

    #[test]
    fn test_set_tuning_stops_notes() {
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        arbiter.touch_on(electrode(0, 0), 1000, &mut log);
        let mut tuning = *arbiter.tuning();
        tuning.capo_up();
        arbiter.set_tuning(tuning, &mut log);
        assert_eq!(log.last(), Some(&NoteEvent::Off { string: 0, note: 55 }));
        assert_eq!(arbiter.tuning().capo(), 1);
    }

    #[test]
    fn test_note_above_range_not_played() {
        let (mut arbiter, mut log) = strum_arbiter();
        let mut tuning = Tuning::standard();
        tuning.set_pitch(0, 127);
        arbiter.set_tuning(tuning, &mut log);
        arbiter.touch_on(electrode(0, 0), 1000, &mut log);
        arbiter.touch_on(electrode(0, 5), 1100, &mut log);
        assert!(log.is_empty());
        assert_eq!(arbiter.sounding(0), None);
    }

    #[test]
    fn test_orphan_open_string_gets_sustain() {
        let (mut arbiter, mut log) = strum_arbiter();
        arbiter.touch_on(electrode(0, 5), 1000, &mut log);
        arbiter.strings[0].open_release = None;
        arbiter.frets[0][STRUM].touched = false;
        arbiter.sweep(1100, &mut log);
        assert_eq!(arbiter.string_state(0).unwrap().open_release, Some(1100));
        arbiter.sweep(4100, &mut log);
        assert_eq!(arbiter.sounding(0), None);
    }
}
