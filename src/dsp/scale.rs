#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Frequency of note index 0 in Hz. This is not A440: index 0 is 128 Hz,
/// so every twelfth index lands on a power of two.
pub const BASE_FREQUENCY: f64 = 128.0;

/// Frequency tables that map a note index to Hz.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// 12-tone equal temperament, each index one semitone (ratio 2^(1/12)).
    #[default]
    EqualTemperament,
}

impl Scale {
    /// Id of the only defined scale table.
    pub const EQUAL_TEMPERAMENT_ID: u8 = 0;

    /// Look up a scale table by id. Unknown ids are an error.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            Self::EQUAL_TEMPERAMENT_ID => Ok(Scale::EqualTemperament),
            other => Err(Error::UnknownScale(other)),
        }
    }

    /// Look up a scale table by id, falling back to [`Scale::EqualTemperament`]
    /// for unknown ids. The fallback is logged so it never happens silently.
    pub fn resolve(id: u8) -> Self {
        Self::from_id(id).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to equal temperament");
            Scale::default()
        })
    }

    /// Frequency in Hz of `note`. Negative indices go below 128 Hz.
    #[inline]
    pub fn frequency(self, note: i32) -> f64 {
        match self {
            // powf on note/12 keeps octaves exact: index 12 gives exactly 2.0
            Scale::EqualTemperament => BASE_FREQUENCY * 2.0_f64.powf(note as f64 / 12.0),
        }
    }
}

/// Frequency of `note` in the default scale.
#[inline]
pub fn scale(note: i32) -> f64 {
    Scale::EqualTemperament.frequency(note)
}
