//! Events crossing from the control loop to the voices.

/// Velocity the dispatcher attaches to every note-on.
pub const NOTE_ON_VELOCITY: f32 = 0.5;

/// A note change for one string's voice. Velocity 0 means note-off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthEvent {
    /// String index, selecting the voice.
    pub string: u8,
    /// MIDI note.
    pub note: u8,
    /// 0 to 1.
    pub velocity: f32,
}

impl SynthEvent {
    /// Note-on at the dispatch velocity.
    pub fn note_on(string: u8, note: u8) -> Self {
        Self {
            string,
            note,
            velocity: NOTE_ON_VELOCITY,
        }
    }

    /// Note-off.
    pub fn note_off(string: u8, note: u8) -> Self {
        Self {
            string,
            note,
            velocity: 0.0,
        }
    }

    /// True for velocity 0.
    pub fn is_off(&self) -> bool {
        self.velocity <= 0.0
    }
}
