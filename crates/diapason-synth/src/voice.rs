//! Single-note voice for one string.
//!
//! Each string is its own monophonic instrument: a new note retriggers the
//! envelope from its current level, and a note-off only releases the voice
//! if it names the note the voice is holding.

use core::f32::consts::FRAC_PI_4;

use libm::{cosf, sinf};

use crate::envelope::{Envelope, Stage};
use crate::event::SynthEvent;
use crate::oscillator::{Oscillator, cents_to_ratio, midi_to_freq};
use crate::patch::Patch;

/// Per-voice scale. Four full-velocity strings, panned, stay within unit
/// range in either channel.
pub const VOICE_HEADROOM: f32 = 0.35;

/// Stereo spread of the strings around the center, 0 to 1.
const STRING_SPREAD: f32 = 0.6;

/// Voice bound to one string.
#[derive(Debug, Clone)]
pub struct StringVoice {
    string: u8,
    osc1: Oscillator,
    osc2: Oscillator,
    envelope: Envelope,
    detune_ratio: f32,
    mix: f32,
    note: Option<u8>,
    velocity: f32,
    gain_l: f32,
    gain_r: f32,
}

impl StringVoice {
    /// Silent voice for `string` (0 to 3), panned by string position.
    pub fn new(string: u8, sample_rate: f32) -> Self {
        let pan = (f32::from(string.min(3)) / 1.5 - 1.0) * STRING_SPREAD;
        let angle = (pan + 1.0) * FRAC_PI_4;
        let mut voice = Self {
            string,
            osc1: Oscillator::new(sample_rate),
            osc2: Oscillator::new(sample_rate),
            envelope: Envelope::new(sample_rate),
            detune_ratio: 1.0,
            mix: 0.0,
            note: None,
            velocity: 0.0,
            gain_l: cosf(angle),
            gain_r: sinf(angle),
        };
        voice.set_patch(&Patch::default());
        voice
    }

    /// String this voice plays.
    pub fn string(&self) -> u8 {
        self.string
    }

    /// Held or releasing note.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// True while the envelope is producing sound.
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Envelope segment.
    pub fn stage(&self) -> Stage {
        self.envelope.stage()
    }

    /// Left and right pan gains.
    pub fn pan_gains(&self) -> (f32, f32) {
        (self.gain_l, self.gain_r)
    }

    /// Loads oscillator and envelope settings. A sounding note keeps its
    /// pitch and retunes the second oscillator.
    pub fn set_patch(&mut self, patch: &Patch) {
        self.osc1.set_waveform(patch.osc1);
        self.osc2.set_waveform(patch.osc2);
        self.detune_ratio = cents_to_ratio(patch.detune_cents);
        self.mix = patch.mix.clamp(0.0, 1.0);
        self.envelope.set_shape(patch.envelope);
        if let Some(note) = self.note {
            self.tune(note);
        }
    }

    /// Changes sample rate for oscillators and envelope.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc1.set_sample_rate(sample_rate);
        self.osc2.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
    }

    fn tune(&mut self, note: u8) {
        let freq = midi_to_freq(note);
        self.osc1.set_frequency(freq);
        self.osc2.set_frequency(freq * self.detune_ratio);
    }

    /// Starts `note`, retriggering from the current level.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if !self.envelope.is_active() {
            self.osc1.reset();
            self.osc2.reset();
        }
        self.tune(note);
        self.note = Some(note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.envelope.gate_on();
    }

    /// Releases the voice if it is holding `note`.
    pub fn note_off(&mut self, note: u8) {
        if self.note == Some(note) {
            self.envelope.gate_off();
        }
    }

    /// Routes an event addressed to this voice's string.
    pub fn apply(&mut self, event: &SynthEvent) {
        if event.is_off() {
            self.note_off(event.note);
        } else {
            self.note_on(event.note, event.velocity);
        }
    }

    /// Silences at once.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.note = None;
    }

    /// One stereo frame.
    #[inline]
    pub fn process_stereo(&mut self) -> (f32, f32) {
        let level = self.envelope.advance();
        if !self.envelope.is_active() {
            self.note = None;
            return (0.0, 0.0);
        }
        let raw = (self.osc1.advance() + self.mix * self.osc2.advance()) / (1.0 + self.mix);
        let s = raw * level * self.velocity * VOICE_HEADROOM;
        (s * self.gain_l, s * self.gain_r)
    }

    /// Adds this voice into an interleaved stereo buffer.
    pub fn render_add(&mut self, frames: &mut [f32]) {
        if !self.envelope.is_active() {
            return;
        }
        for frame in frames.chunks_exact_mut(2) {
            let (l, r) = self.process_stereo();
            frame[0] += l;
            frame[1] += r;
        }
    }
}
