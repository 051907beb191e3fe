//! Diapason Synth - per-string voices and note dispatch
//!
//! Every string of the fretboard is a single-voice instrument. The four
//! voices are split into two partitions so that two render contexts can
//! each produce half of every block.
//!
//! # Core Abstractions
//!
//! ## Sound
//!
//! - [`Oscillator`] - Band-limited sine, triangle, saw and square
//! - [`Envelope`] - Exponential ADSR
//! - [`Patch`] - Oscillator pair plus envelope, from the factory bank
//! - [`StringVoice`] - One string's voice, panned by string position
//! - [`VoicePartition`] - Strings 0-1 or 2-3, rendered as a unit
//!
//! ## Dispatch
//!
//! - [`NoteDispatcher`] - [`NoteSink`](diapason_touch::NoteSink) that
//!   validates notes and forwards them as [`SynthEvent`]s and MIDI bytes
//! - [`EventQueue`] - Where synth events go (a channel under `std`)
//! - [`MidiOut`] - Where MIDI bytes go
//!
//! # no_std Support
//!
//! Everything but the channel-backed queue works without `std`:
//!
//! ```toml
//! [dependencies]
//! diapason-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use diapason_synth::{VoicePartition, SynthEvent};
//!
//! let mut primary = VoicePartition::primary(44100.0);
//! primary.apply(&SynthEvent::note_on(0, 57));
//!
//! let mut frames = [0.0f32; 2 * 64];
//! primary.render(&mut frames);
//! assert!(frames.iter().any(|&s| s != 0.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod dispatch;
pub mod envelope;
pub mod event;
pub mod midi;
pub mod oscillator;
pub mod partition;
pub mod patch;
pub mod voice;
pub mod volume;

pub use dispatch::{EventQueue, NoteDispatcher};
pub use envelope::{Envelope, EnvelopeShape, Stage};
pub use event::{NOTE_ON_VELOCITY, SynthEvent};
pub use midi::{MidiOut, NoMidi, midi_velocity, note_off_bytes, note_on_bytes};
pub use oscillator::{Oscillator, Waveform, cents_to_ratio, midi_to_freq};
pub use partition::{Half, VOICES_PER_PARTITION, VoicePartition};
pub use patch::{DEFAULT_PATCH, PATCHES, Patch};
pub use voice::{StringVoice, VOICE_HEADROOM};
pub use volume::{
    DEFAULT_UI_VOLUME, MAX_SYNTH_VOLUME, MAX_UI_VOLUME, master_gain, ui_volume_to_synth,
};
