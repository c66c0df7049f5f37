//! The engine's view of the input collaborator.
//!
//! Input is a fixed, ordered table of physical keys ([`KeyLayout`]) and a
//! per-key "is it down right now" poll ([`KeyPoller`]). Edges are never
//! reported by the input side; the engine finds them by comparing the poll
//! against the registry.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::note::NoteId;

/// Per-key pressed state, indexed by position in the [`KeyLayout`].
pub trait KeyPoller {
    fn is_pressed(&self, key: usize) -> bool;
}

impl KeyPoller for [bool] {
    fn is_pressed(&self, key: usize) -> bool {
        self.get(key).copied().unwrap_or(false)
    }
}

impl KeyPoller for Vec<bool> {
    fn is_pressed(&self, key: usize) -> bool {
        self.as_slice().is_pressed(key)
    }
}

/// Two rows of a QWERTY keyboard laid out like a piano: the bottom row is
/// the white keys, the row above holds the black keys.
pub const DEFAULT_KEYS: &str = "zsxcfvgbnjmk,l./";

/// Ordered mapping from physical keys to note indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    keys: Vec<(char, NoteId)>,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::chromatic(DEFAULT_KEYS, 0)
    }
}

impl KeyLayout {
    /// Consecutive semitones starting at `first_note`, one per character.
    pub fn chromatic(keys: &str, first_note: NoteId) -> Self {
        Self {
            keys: keys
                .chars()
                .zip(first_note..)
                .map(|(key, note)| (key.to_ascii_lowercase(), note))
                .collect(),
        }
    }

    pub fn from_pairs(keys: Vec<(char, NoteId)>) -> Self {
        Self { keys }
    }

    /// Reject empty layouts, keys that appear twice and notes bound to
    /// more than one key.
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(Error::InvalidConfig("key layout is empty".into()));
        }
        for (i, (key, note)) in self.keys.iter().enumerate() {
            let earlier = &self.keys[..i];
            if earlier.iter().any(|(other, _)| other == key) {
                return Err(Error::InvalidConfig(format!(
                    "key '{key}' appears twice in the layout"
                )));
            }
            if earlier.iter().any(|(_, other)| other == note) {
                return Err(Error::InvalidConfig(format!(
                    "note {note} is bound to more than one key"
                )));
            }
        }
        Ok(())
    }

    /// Position of `key` in the layout. Letters match either case.
    pub fn position(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        self.keys.iter().position(|&(k, _)| k == key)
    }

    pub fn note(&self, position: usize) -> Option<NoteId> {
        self.keys.get(position).map(|&(_, note)| note)
    }

    /// Layout positions bound to note `id`, in layout order.
    pub fn positions(&self, id: NoteId) -> impl Iterator<Item = usize> + '_ {
        self.keys
            .iter()
            .enumerate()
            .filter(move |&(_, &(_, note))| note == id)
            .map(|(position, _)| position)
    }

    pub fn key(&self, position: usize) -> Option<char> {
        self.keys.get(position).map(|&(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, NoteId)> + '_ {
        self.keys.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
