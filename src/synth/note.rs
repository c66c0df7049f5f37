/// Key identity / scale position of a note. Signed so instruments can
/// reach below index 0 with negative partial offsets.
pub type NoteId = i32;

/// Instrument selector carried by each note.
pub type Channel = u8;

/// A sounding or releasing note.
///
/// `on > off` means the key is held; `off >= on` means the note is in (or
/// past) its release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub id: NoteId,
    /// Time the note was last activated.
    pub on: f64,
    /// Time the note was last released.
    pub off: f64,
    pub active: bool,
    pub channel: Channel,
}

impl Note {
    /// Release timestamp of a note that has never been released. Sits below
    /// every `on`, so a press at t = 0 still counts as held.
    pub const NEVER_RELEASED: f64 = f64::NEG_INFINITY;

    /// A freshly pressed note.
    pub fn pressed(id: NoteId, channel: Channel, now: f64) -> Self {
        Self {
            id,
            on: now,
            off: Self::NEVER_RELEASED,
            active: true,
            channel,
        }
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.on > self.off
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        !self.is_held()
    }
}
