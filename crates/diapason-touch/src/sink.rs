//! Where note decisions go.

/// Receiver of the arbiter's note decisions.
///
/// Strings are independent single-voice instruments: a `note_on` for a
/// string replaces whatever that string was sounding, and the arbiter sends
/// the matching `note_off` itself when the pitch changes.
pub trait NoteSink {
    /// Starts `note` on `string`.
    fn note_on(&mut self, string: u8, note: u8);
    /// Stops `note` on `string`.
    fn note_off(&mut self, string: u8, note: u8);
}

impl<S: NoteSink + ?Sized> NoteSink for &mut S {
    fn note_on(&mut self, string: u8, note: u8) {
        (**self).note_on(string, note);
    }

    fn note_off(&mut self, string: u8, note: u8) {
        (**self).note_off(string, note);
    }
}

/// One recorded note decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteEvent {
    /// Note started.
    On {
        /// String index.
        string: u8,
        /// MIDI note.
        note: u8,
    },
    /// Note stopped.
    Off {
        /// String index.
        string: u8,
        /// MIDI note.
        note: u8,
    },
}

/// Records every decision in order.
///
/// ```rust
/// use diapason_touch::{NoteEvent, NoteSink};
///
/// let mut log: Vec<NoteEvent> = Vec::new();
/// log.note_on(0, 57);
/// assert_eq!(log, [NoteEvent::On { string: 0, note: 57 }]);
/// ```
#[cfg(feature = "std")]
impl NoteSink for Vec<NoteEvent> {
    fn note_on(&mut self, string: u8, note: u8) {
        self.push(NoteEvent::On { string, note });
    }

    fn note_off(&mut self, string: u8, note: u8) {
        self.push(NoteEvent::Off { string, note });
    }
}
