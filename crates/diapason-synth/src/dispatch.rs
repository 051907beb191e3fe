//! Note dispatch: the boundary between note decisions and sound.
//!
//! [`NoteDispatcher`] receives `(string, note)` decisions through
//! [`NoteSink`], drops anything off the board or outside MIDI range, and
//! forwards the rest as [`SynthEvent`]s to a queue and, when attached, as
//! MIDI bytes to a [`MidiOut`].

use diapason_touch::{MAX_NOTE, NoteSink, STRINGS};

use crate::event::SynthEvent;
use crate::midi::{MidiOut, NoMidi, note_off_bytes, note_on_bytes};

/// Where synth events go. Implementations must not block.
pub trait EventQueue {
    /// Enqueues an event. Returns `false` if it was dropped.
    fn push(&mut self, event: SynthEvent) -> bool;
}

impl<Q: EventQueue + ?Sized> EventQueue for &mut Q {
    fn push(&mut self, event: SynthEvent) -> bool {
        (**self).push(event)
    }
}

#[cfg(feature = "std")]
impl EventQueue for Vec<SynthEvent> {
    fn push(&mut self, event: SynthEvent) -> bool {
        Vec::push(self, event);
        true
    }
}

#[cfg(feature = "std")]
impl EventQueue for crossbeam_channel::Sender<SynthEvent> {
    fn push(&mut self, event: SynthEvent) -> bool {
        self.try_send(event).is_ok()
    }
}

/// Forwards note decisions to the synth and optional MIDI output.
///
/// ```rust
/// use diapason_synth::{NoteDispatcher, SynthEvent};
/// use diapason_touch::NoteSink;
///
/// let mut dispatcher = NoteDispatcher::new(Vec::new());
/// dispatcher.note_on(1, 54);
/// dispatcher.note_on(7, 54); // no such string
/// assert_eq!(dispatcher.queue(), &[SynthEvent::note_on(1, 54)]);
/// ```
#[derive(Debug)]
pub struct NoteDispatcher<Q, M = NoMidi> {
    queue: Q,
    midi: M,
    dropped: u64,
}

impl<Q: EventQueue> NoteDispatcher<Q, NoMidi> {
    /// Dispatcher with no MIDI output.
    pub fn new(queue: Q) -> Self {
        Self::with_midi(queue, NoMidi)
    }
}

impl<Q: EventQueue, M: MidiOut> NoteDispatcher<Q, M> {
    /// Dispatcher that also writes MIDI.
    pub fn with_midi(queue: Q, midi: M) -> Self {
        Self {
            queue,
            midi,
            dropped: 0,
        }
    }

    /// Event queue.
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// MIDI output.
    pub fn midi(&self) -> &M {
        &self.midi
    }

    /// Events the queue refused.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Splits into queue and MIDI output.
    pub fn into_parts(self) -> (Q, M) {
        (self.queue, self.midi)
    }

    fn valid(string: u8, note: u8) -> bool {
        usize::from(string) < STRINGS && note <= MAX_NOTE
    }

    fn enqueue(&mut self, event: SynthEvent) {
        if !self.queue.push(event) {
            self.dropped += 1;
            #[cfg(feature = "tracing")]
            tracing::warn!(string = event.string, note = event.note, "synth event queue full");
        }
    }
}

impl<Q: EventQueue, M: MidiOut> NoteSink for NoteDispatcher<Q, M> {
    fn note_on(&mut self, string: u8, note: u8) {
        if !Self::valid(string, note) {
            return;
        }
        let event = SynthEvent::note_on(string, note);
        self.enqueue(event);
        self.midi.send(&note_on_bytes(note, event.velocity));
    }

    fn note_off(&mut self, string: u8, note: u8) {
        if !Self::valid(string, note) {
            return;
        }
        self.enqueue(SynthEvent::note_off(string, note));
        self.midi.send(&note_off_bytes(note));
    }
}
