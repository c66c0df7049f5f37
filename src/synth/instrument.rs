//! Instruments: an envelope plus a weighted stack of oscillator partials.
//!
//! A voice is pure data. [`Instrument::bell`] and [`Instrument::harmonica`]
//! are just partial tables; new voices are built the same way with
//! [`Instrument::new`] instead of writing another sound formula.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::dsp::{osc, Envelope, Scale, Vibrato, Waveform};
use crate::error::Error;

use super::note::Note;

/// One weighted oscillator term of a timbre.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Semitones added to the note id before the scale lookup.
    pub scale_offset: i32,
    pub waveform: Waveform,
    pub weight: f64,
    pub vibrato: Vibrato,
}

impl Partial {
    pub const fn new(scale_offset: i32, waveform: Waveform, weight: f64) -> Self {
        Self {
            scale_offset,
            waveform,
            weight,
            vibrato: Vibrato::NONE,
        }
    }

    pub const fn with_vibrato(mut self, rate: f64, depth: f64) -> Self {
        self.vibrato = Vibrato::new(rate, depth);
        self
    }
}

/// Output of one instrument for one note at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sound {
    pub sample: f64,
    /// The envelope has decayed to silence and the key is released.
    pub finished: bool,
}

impl Sound {
    pub const SILENT_HELD: Sound = Sound {
        sample: 0.0,
        finished: false,
    };

    pub fn scaled(self, gain: f64) -> Self {
        Self {
            sample: self.sample * gain,
            ..self
        }
    }
}

const BELL_PARTIALS: [Partial; 3] = [
    Partial::new(12, Waveform::Sine, 1.0).with_vibrato(5.0, 0.001),
    Partial::new(24, Waveform::Sine, 0.5),
    Partial::new(36, Waveform::Sine, 0.25),
];

const HARMONICA_PARTIALS: [Partial; 3] = [
    Partial::new(0, Waveform::Square, 1.0).with_vibrato(5.0, 0.001),
    Partial::new(0, Waveform::Square, 0.5),
    Partial::new(-12, Waveform::Square, 0.25),
];

/// The built-in voices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Bell,
    Harmonica,
}

impl InstrumentKind {
    pub fn build(self) -> Instrument {
        match self {
            InstrumentKind::Bell => Instrument::bell(),
            InstrumentKind::Harmonica => Instrument::harmonica(),
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKind::Bell => f.write_str("bell"),
            InstrumentKind::Harmonica => f.write_str("harmonica"),
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bell" => Ok(InstrumentKind::Bell),
            "harmonica" => Ok(InstrumentKind::Harmonica),
            other => Err(Error::InvalidConfig(format!("unknown instrument '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    name: String,
    volume: f64,
    envelope: Envelope,
    scale: Scale,
    partials: Vec<Partial>,
}

impl Instrument {
    pub fn new(name: impl Into<String>, envelope: Envelope, partials: Vec<Partial>) -> Self {
        Self {
            name: name.into(),
            volume: 1.0,
            envelope,
            scale: Scale::EqualTemperament,
            partials,
        }
    }

    /// Three sine partials one, two and three octaves up; short attack,
    /// long decay to half level.
    pub fn bell() -> Self {
        let envelope = Envelope::adsr(0.01, 1.0, 0.5, 1.0);
        Self::new("bell", envelope, BELL_PARTIALS.to_vec())
    }

    /// Stacked reduced-level squares with a sub-octave; slow attack, full
    /// sustain.
    pub fn harmonica() -> Self {
        let envelope = Envelope::adsr(0.2, 1.0, 1.0, 1.0);
        Self::new("harmonica", envelope, HARMONICA_PARTIALS.to_vec())
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Sample for `note` at engine time `time`.
    ///
    /// Partials are evaluated at `note.on - time`, i.e. the negated time
    /// since onset. The sign matters: it fixes the relative phase of the
    /// vibrato partial against the plain ones.
    pub fn sound<R: Rng + ?Sized>(&self, time: f64, note: &Note, noise: &mut R) -> Sound {
        let amplitude = self.envelope.amplitude(time, note.on, note.off);
        let finished = amplitude <= 0.0 && note.is_released();

        let phase_time = note.on - time;
        let timbre: f64 = self
            .partials
            .iter()
            .map(|p| {
                let frequency = self.scale.frequency(note.id + p.scale_offset);
                p.weight * osc(frequency, phase_time, p.waveform, p.vibrato, noise)
            })
            .sum();

        Sound {
            sample: amplitude * timbre * self.volume,
            finished,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }
}
