use super::note::{Channel, Note, NoteId};

/*
Note Registry
=============

The set of notes that are currently sounding or releasing. It is an
unordered Vec searched linearly by id: the number of live notes is small
(bounded by the keys on the keyboard), so a scan is cheaper than hashing
and never allocates on the audio thread.

Edge Detection
--------------

The input side does not report "pressed" / "released" edges. It reports
whether each key is down right now, and the edge is found by comparing
that against what the registry already holds:

    registry has id?   key down?   note state        action
    ----------------   ---------   ----------        ------
    no                 yes         -                 insert (Started)
    no                 no          -                 nothing
    yes                yes         held              nothing
    yes                yes         released          on = now (Retriggered)
    yes                no          held              off = now (Released)
    yes                no          released          nothing

A retrigger leaves `off` alone; it is overwritten at the next release.

Uniqueness
----------

At most one note per id exists at a time. The registry relies on every
insert going through `sync_key`, which looks the id up first; it does not
check again on its own.
*/

/// What `sync_key` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    /// A new note was inserted.
    Started,
    /// A releasing note was pressed again and re-entered its attack.
    Retriggered,
    /// A held note was released.
    Released,
}

#[derive(Debug, Clone, Default)]
pub struct NoteRegistry {
    notes: Vec<Note>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` notes so inserts stay allocation-free.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: Vec::with_capacity(capacity),
        }
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Apply the current pressed state of key `id` at time `now`.
    ///
    /// `channel` is only used when a new note is created.
    pub fn sync_key(
        &mut self,
        id: NoteId,
        pressed: bool,
        now: f64,
        channel: Channel,
    ) -> Option<KeyTransition> {
        let Some(index) = self.notes.iter().position(|note| note.id == id) else {
            if !pressed {
                return None;
            }
            self.notes.push(Note::pressed(id, channel, now));
            return Some(KeyTransition::Started);
        };

        let note = &mut self.notes[index];
        if pressed && note.is_released() {
            note.on = now;
            note.active = true;
            Some(KeyTransition::Retriggered)
        } else if !pressed && note.is_held() {
            note.off = now;
            Some(KeyTransition::Released)
        } else {
            None
        }
    }

    pub fn key_down(&mut self, id: NoteId, now: f64, channel: Channel) -> Option<KeyTransition> {
        self.sync_key(id, true, now, channel)
    }

    pub fn key_up(&mut self, id: NoteId, now: f64) -> Option<KeyTransition> {
        // channel is irrelevant: a released key never creates a note
        self.sync_key(id, false, now, 0)
    }

    /// Release every held note at `now`. Returns how many were released.
    pub fn release_all(&mut self, now: f64) -> usize {
        let mut released = 0;
        for note in self.notes.iter_mut().filter(|note| note.is_held()) {
            note.off = now;
            released += 1;
        }
        released
    }

    /// Visit every note, then drop the ones that are finished and released.
    ///
    /// `visit` returns whether the note's envelope has fully decayed. Held
    /// notes are never removed, whatever `visit` says.
    pub fn sweep<F>(&mut self, mut visit: F)
    where
        F: FnMut(&Note) -> bool,
    {
        for note in self.notes.iter_mut() {
            let finished = visit(note);
            if finished && note.is_released() {
                note.active = false;
            }
        }
        self.notes.retain(|note| note.active);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL: Channel = 2;

    #[test]
    fn press_inserts_once() {
        let mut reg = NoteRegistry::new();
        assert_eq!(reg.key_down(4, 0.0, BELL), Some(KeyTransition::Started));
        assert_eq!(reg.key_down(4, 0.1, BELL), None);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find(4).map(|n| n.on), Some(0.0));
    }

    #[test]
    fn release_without_note_is_noop() {
        let mut reg = NoteRegistry::new();
        assert_eq!(reg.key_up(4, 0.5), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn release_only_once() {
        let mut reg = NoteRegistry::new();
        reg.key_down(1, 0.0, BELL);
        assert_eq!(reg.key_up(1, 0.3), Some(KeyTransition::Released));
        assert_eq!(reg.key_up(1, 0.4), None);
        assert_eq!(reg.find(1).map(|n| n.off), Some(0.3));
    }

    #[test]
    fn repress_during_release_retriggers() {
        let mut reg = NoteRegistry::new();
        reg.key_down(1, 0.0, BELL);
        reg.key_up(1, 1.0);
        assert_eq!(reg.key_down(1, 1.2, BELL), Some(KeyTransition::Retriggered));

        let note = reg.find(1).copied().unwrap();
        assert_eq!(note.on, 1.2);
        assert_eq!(note.off, 1.0);
        assert!(note.active);
        assert!(note.is_held());
    }

    #[test]
    fn sweep_keeps_held_notes() {
        let mut reg = NoteRegistry::new();
        reg.key_down(1, 0.0, BELL);
        reg.key_down(2, 0.0, BELL);
        reg.key_up(2, 0.5);

        // everything reports finished, only the released note goes
        reg.sweep(|_| true);
        assert_eq!(reg.len(), 1);
        assert!(reg.find(1).is_some());
        assert!(reg.find(2).is_none());
    }

    #[test]
    fn sweep_keeps_unfinished_releases() {
        let mut reg = NoteRegistry::new();
        reg.key_down(1, 0.0, BELL);
        reg.key_up(1, 0.5);
        reg.sweep(|_| false);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn release_all_releases_held_only() {
        let mut reg = NoteRegistry::new();
        reg.key_down(1, 0.0, BELL);
        reg.key_down(2, 0.0, BELL);
        reg.key_up(2, 0.5);
        assert_eq!(reg.release_all(1.0), 1);
        assert!(reg.iter().all(Note::is_released));
        assert_eq!(reg.find(2).map(|n| n.off), Some(0.5));
    }
}
