//! Three-byte MIDI channel messages for the note stream.

/// Note-on status byte, channel 1.
pub const NOTE_ON: u8 = 0x90;
/// Note-off status byte, channel 1.
pub const NOTE_OFF: u8 = 0x80;

/// Scales a 0 to 1 velocity to the 7-bit MIDI range, truncating.
#[inline]
pub fn midi_velocity(velocity: f32) -> u8 {
    (velocity.clamp(0.0, 1.0) * 127.0) as u8
}

/// `[0x90, note, velocity]`.
pub fn note_on_bytes(note: u8, velocity: f32) -> [u8; 3] {
    [NOTE_ON, note & 0x7f, midi_velocity(velocity)]
}

/// `[0x80, note, 0]`.
pub fn note_off_bytes(note: u8) -> [u8; 3] {
    [NOTE_OFF, note & 0x7f, 0]
}

/// Destination for raw MIDI messages.
pub trait MidiOut {
    /// Writes one message. Transport failures are the implementor's to
    /// report; the note stream carries on regardless.
    fn send(&mut self, message: &[u8; 3]);
}

impl<M: MidiOut + ?Sized> MidiOut for &mut M {
    fn send(&mut self, message: &[u8; 3]) {
        (**self).send(message);
    }
}

impl<M: MidiOut> MidiOut for Option<M> {
    fn send(&mut self, message: &[u8; 3]) {
        if let Some(out) = self {
            out.send(message);
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMidi;

impl MidiOut for NoMidi {
    fn send(&mut self, _message: &[u8; 3]) {}
}

#[cfg(feature = "std")]
impl MidiOut for Vec<[u8; 3]> {
    fn send(&mut self, message: &[u8; 3]) {
        self.push(*message);
    }
}
