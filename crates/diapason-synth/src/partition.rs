//! Halves of the voice pool, one per render context.
//!
//! The primary context renders strings 0 and 1; the secondary context
//! renders strings 2 and 3. A partition is moved whole into the context
//! that renders it, so no voice is ever touched by two contexts.

use crate::event::SynthEvent;
use crate::patch::Patch;
use crate::voice::StringVoice;

/// Strings per partition.
pub const VOICES_PER_PARTITION: usize = 2;

/// Which half of the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    /// Strings 0 and 1.
    Primary,
    /// Strings 2 and 3.
    Secondary,
}

impl Half {
    /// First string of this half.
    pub const fn first_string(self) -> u8 {
        match self {
            Half::Primary => 0,
            Half::Secondary => VOICES_PER_PARTITION as u8,
        }
    }

    /// Half that owns `string`, if any.
    pub fn of_string(string: u8) -> Option<Half> {
        match string {
            0 | 1 => Some(Half::Primary),
            2 | 3 => Some(Half::Secondary),
            _ => None,
        }
    }
}

/// Two string voices rendered together.
#[derive(Debug, Clone)]
pub struct VoicePartition {
    half: Half,
    voices: [StringVoice; VOICES_PER_PARTITION],
}

impl VoicePartition {
    /// Fresh partition for one half.
    pub fn new(half: Half, sample_rate: f32) -> Self {
        let first = half.first_string();
        Self {
            half,
            voices: [
                StringVoice::new(first, sample_rate),
                StringVoice::new(first + 1, sample_rate),
            ],
        }
    }

    /// Strings 0 and 1.
    pub fn primary(sample_rate: f32) -> Self {
        Self::new(Half::Primary, sample_rate)
    }

    /// Strings 2 and 3.
    pub fn secondary(sample_rate: f32) -> Self {
        Self::new(Half::Secondary, sample_rate)
    }

    /// Half this partition covers.
    pub fn half(&self) -> Half {
        self.half
    }

    /// True when `string` belongs here.
    pub fn owns(&self, string: u8) -> bool {
        Half::of_string(string) == Some(self.half)
    }

    /// Voice for `string`, if owned.
    pub fn voice(&self, string: u8) -> Option<&StringVoice> {
        self.owns(string)
            .then(|| &self.voices[usize::from(string - self.half.first_string())])
    }

    /// Applies an event if it targets one of this partition's strings.
    /// Returns whether it did.
    pub fn apply(&mut self, event: &SynthEvent) -> bool {
        if !self.owns(event.string) {
            return false;
        }
        let index = usize::from(event.string - self.half.first_string());
        self.voices[index].apply(event);
        true
    }

    /// Loads a patch into every voice.
    pub fn set_patch(&mut self, patch: &Patch) {
        for voice in &mut self.voices {
            voice.set_patch(patch);
        }
    }

    /// Changes sample rate for every voice.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Silences every voice.
    pub fn kill_all(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Any voice producing sound.
    pub fn is_active(&self) -> bool {
        self.voices.iter().any(StringVoice::is_active)
    }

    /// Overwrites `frames` (interleaved stereo) with this half's mix.
    pub fn render(&mut self, frames: &mut [f32]) {
        frames.fill(0.0);
        for voice in &mut self.voices {
            voice.render_add(frames);
        }
    }
}
