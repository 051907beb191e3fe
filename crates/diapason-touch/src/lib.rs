//! Diapason Touch - fret-touch-to-note decision engine
//!
//! Turns raw electrode transitions from a capacitive fretboard into
//! note-on and note-off decisions, per string, in two playing modes.
//!
//! # Core Abstractions
//!
//! ## Fretboard
//!
//! - [`Position`] - A (string, fret) cell, mapped to and from electrode ids
//! - [`Tuning`] - Open-string pitches plus capo; computes MIDI notes
//! - [`TimingParams`] - User-adjustable arbitration windows, clamped on write
//!
//! ## Arbitration
//!
//! - [`TouchArbiter`] - Owns all touch and playback state; emits notes
//! - [`PlayingMode`] - Tapping (every fret is a key) or strum
//! - [`snapshot`] - Liveness rules deciding which frets a strum sees
//! - [`NoteSink`] - Receiver of note decisions
//!
//! ## Input
//!
//! - [`ElectrodeScanner`] - Status words to edges, one control pass at a time
//! - [`TouchSensor`] - Source of status words
//! - [`Clock`] - Monotonic milliseconds, sampled once per pass
//! - `TouchScript` / `ScriptedSensor` - Text-driven virtual fretboard (`std`)
//!
//! # no_std Support
//!
//! The arbiter, scanner and fretboard types are `no_std` and allocation
//! free. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! diapason-touch = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature logs debounced transitions, hammer-ons
//! and mode changes.
//!
//! # Example
//!
//! ```rust
//! use diapason_touch::{NoteEvent, PlayingMode, Position, TouchArbiter};
//!
//! let mut arbiter = TouchArbiter::default();
//! let mut log: Vec<NoteEvent> = Vec::new();
//! arbiter.set_playing_mode(PlayingMode::Strum, &mut log);
//!
//! let fret = Position::new(1, 3).unwrap().electrode(false);
//! let strum = Position::new(1, 5).unwrap().electrode(false);
//! arbiter.touch_on(fret, 1000, &mut log);
//! arbiter.touch_on(strum, 1050, &mut log);
//!
//! // strummed frets sound one semitone above the tapped pitch
//! assert_eq!(log, [NoteEvent::On { string: 1, note: 54 }]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod arbiter;
pub mod clock;
pub mod fretboard;
pub mod scan;
#[cfg(feature = "std")]
pub mod script;
pub mod sink;
pub mod snapshot;
pub mod timing;

pub use arbiter::{PlayingMode, StringState, TouchArbiter};
pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::MonotonicClock;
pub use fretboard::{
    DEFAULT_PITCHES, ELECTRODES, FRETS, LAYOUT, MAX_CAPO, MAX_NOTE, Position, REGULAR_FRETS,
    STRINGS, STRUM_FRET, Tuning,
};
pub use scan::{Edge, Edges, ElectrodeScanner, SENSORS, TouchSensor};
#[cfg(feature = "std")]
pub use script::{ScriptError, ScriptEvent, ScriptedSensor, TouchScript};
pub use sink::{NoteEvent, NoteSink};
pub use snapshot::{FretState, Liveness};
pub use timing::{DEBOUNCE_MS, OPEN_STRING_SUSTAIN_MS, RELEASE_TOLERANCE_MS, TimingParams};
