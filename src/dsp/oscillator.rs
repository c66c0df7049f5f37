#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::f64::consts::{FRAC_2_PI, TAU};

use crate::error::{Error, Result};

/*
Oscillators
===========

An oscillator turns a frequency and a point in time into one sample of a
periodic waveform. These are stateless: the phase is computed from absolute
time on every call, so a note never has to remember where its oscillator
left off. That is what lets a single immutable instrument serve every note
at once, from any thread.

Vocabulary
----------

  angular frequency   Radians per second, w = 2πf. Multiplying by time in
                      seconds gives the phase in radians.

  phase               Where in the cycle we are, φ = w(f)·t. sin(φ) is the
                      pure tone; every other waveform is shaped from it.

  vibrato             A slow wobble in pitch. Here it is added directly to
                      the phase:

                          φ = w(f)·t + depth·f·sin(w(rate)·t)

                      Note that the depth is scaled by the carrier frequency,
                      so higher notes wobble by proportionally more radians.


Waveforms
---------

  Sine        sin(φ)
  Square      ±0.1 depending on the sign of sin(φ). The reduced amplitude
              is deliberate: a full-scale square is far louder than a sine
              of the same peak.
  Triangle    (2/π)·asin(sin(φ))
  AnalogSaw   Additive: (2/π)·Σ sin(n·w(f)·t)/n for n = 1..99. Band-limited,
              so it has the slightly rounded "analog" edge. Vibrato does not
              apply to this one.
  Noise       Uniform in [-1, 1] from the caller's random source.

Waveform ids 0..=4 map to the list above in order; any other id renders
silence (see `osc_by_id`).
*/

/// Number of harmonics summed by the additive sawtooth.
pub const SAW_HARMONICS: u32 = 99;

/// Level of the square wave. Not ±1.
pub const SQUARE_LEVEL: f64 = 0.1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    AnalogSaw,
    Noise,
}

impl Waveform {
    /// Map a numeric waveform id to a waveform. Ids outside `0..=4` are `None`.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Waveform::Sine),
            1 => Some(Waveform::Square),
            2 => Some(Waveform::Triangle),
            3 => Some(Waveform::AnalogSaw),
            4 => Some(Waveform::Noise),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::AnalogSaw => 3,
            Waveform::Noise => 4,
        }
    }
}

impl TryFrom<u8> for Waveform {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Self::from_id(id).ok_or(Error::UnknownWaveform(id))
    }
}

/// Phase-domain vibrato: `rate` in Hz, `depth` scaled by the carrier frequency.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vibrato {
    pub rate: f64,
    pub depth: f64,
}

impl Vibrato {
    pub const NONE: Vibrato = Vibrato {
        rate: 0.0,
        depth: 0.0,
    };

    pub const fn new(rate: f64, depth: f64) -> Self {
        Self { rate, depth }
    }
}

/// Hertz to radians per second.
#[inline]
pub fn angular(hertz: f64) -> f64 {
    hertz * TAU
}

/// One sample of `waveform` at `frequency` Hz and `time` seconds.
///
/// `noise` is only drawn from for [`Waveform::Noise`]; pass a seeded
/// generator to make noise reproducible.
#[inline]
pub fn osc<R: Rng + ?Sized>(
    frequency: f64,
    time: f64,
    waveform: Waveform,
    vibrato: Vibrato,
    noise: &mut R,
) -> f64 {
    let phase = angular(frequency) * time
        + vibrato.depth * frequency * (angular(vibrato.rate) * time).sin();

    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase.sin() > 0.0 {
                SQUARE_LEVEL
            } else {
                -SQUARE_LEVEL
            }
        }
        Waveform::Triangle => phase.sin().asin() * FRAC_2_PI,
        Waveform::AnalogSaw => {
            let w = angular(frequency);
            let sum: f64 = (1..=SAW_HARMONICS)
                .map(|n| {
                    let n = n as f64;
                    (n * w * time).sin() / n
                })
                .sum();
            sum * FRAC_2_PI
        }
        Waveform::Noise => noise.gen_range(-1.0..=1.0),
    }
}

/// Like [`osc`], but with a numeric waveform id. Unknown ids render 0.0.
#[inline]
pub fn osc_by_id<R: Rng + ?Sized>(
    frequency: f64,
    time: f64,
    waveform_id: u8,
    vibrato: Vibrato,
    noise: &mut R,
) -> f64 {
    match Waveform::from_id(waveform_id) {
        Some(waveform) => osc(frequency, time, waveform, vibrato, noise),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn sine_without_vibrato_is_exact() {
        let mut rng = rng();
        for &(f, t) in &[(440.0, 0.001), (128.0, 1.25), (3.3, -0.7), (1000.0, 12.5)] {
            let expected = (TAU * f * t).sin();
            assert_eq!(osc(f, t, Waveform::Sine, Vibrato::NONE, &mut rng), expected);
        }
    }

    #[test]
    fn square_uses_reduced_level() {
        let mut rng = rng();
        let f = 1.0;
        assert_eq!(osc(f, 0.25, Waveform::Square, Vibrato::NONE, &mut rng), 0.1);
        assert_eq!(osc(f, 0.75, Waveform::Square, Vibrato::NONE, &mut rng), -0.1);
    }

    #[test]
    fn triangle_peaks_at_unity() {
        let mut rng = rng();
        let peak = osc(1.0, 0.25, Waveform::Triangle, Vibrato::NONE, &mut rng);
        assert!((peak - 1.0).abs() < 1e-9);
        let half = osc(1.0, 0.125, Waveform::Triangle, Vibrato::NONE, &mut rng);
        assert!((half - 0.5).abs() < 1e-9, "triangle should be linear, got {half}");
    }

    #[test]
    fn saw_is_bounded_and_zero_at_origin() {
        let mut rng = rng();
        assert_eq!(osc(220.0, 0.0, Waveform::AnalogSaw, Vibrato::NONE, &mut rng), 0.0);
        for i in 0..200 {
            let t = i as f64 / 44_100.0;
            let s = osc(220.0, t, Waveform::AnalogSaw, Vibrato::NONE, &mut rng);
            // Gibbs overshoot stays under ~1.18 of the ideal ramp
            assert!(s.abs() < 1.2, "saw out of range: {s}");
        }
    }

    #[test]
    fn noise_is_in_range_and_seedable() {
        let mut a = rng();
        let mut b = rng();
        for _ in 0..1000 {
            let x = osc(0.0, 0.0, Waveform::Noise, Vibrato::NONE, &mut a);
            let y = osc(0.0, 0.0, Waveform::Noise, Vibrato::NONE, &mut b);
            assert!((-1.0..=1.0).contains(&x));
            assert_eq!(x, y);
        }
    }

    #[test]
    fn vibrato_shifts_phase() {
        let mut rng = rng();
        let t = 0.05;
        let plain = osc(256.0, t, Waveform::Sine, Vibrato::NONE, &mut rng);
        let wobbly = osc(256.0, t, Waveform::Sine, Vibrato::new(5.0, 0.001), &mut rng);
        let expected = (angular(256.0) * t + 0.001 * 256.0 * (angular(5.0) * t).sin()).sin();
        assert_ne!(plain, wobbly);
        assert!((wobbly - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_waveform_id_is_silent() {
        let mut rng = rng();
        assert_eq!(Waveform::from_id(5), None);
        assert!(matches!(Waveform::try_from(5), Err(Error::UnknownWaveform(5))));
        assert_eq!(osc_by_id(440.0, 0.3, 5, Vibrato::NONE, &mut rng), 0.0);
        assert_eq!(osc_by_id(440.0, 0.3, 255, Vibrato::NONE, &mut rng), 0.0);
        for id in 0..=4 {
            let waveform = Waveform::from_id(id).unwrap();
            assert_eq!(waveform.id(), id);
        }
    }
}
