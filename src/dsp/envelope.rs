#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope as a PURE FUNCTION of time.
There is no per-sample state machine: the envelope is evaluated from three
timestamps every time it is asked for a level.

    amplitude = f(time, on, off)

  time   The moment we want a level for (seconds on the engine clock).
  on     When the note was last pressed.
  off    When the note was last released.

Because the envelope carries only constants, one `Envelope` can be shared
by every note an instrument plays, on any thread, without locking.


Held or Released?
-----------------

The ordering of the two timestamps says which half of the envelope applies:

    on > off    the key is held       → attack / decay / sustain
    off >= on   the key was released  → release

A re-press during release simply moves `on` past `off`, which puts the note
straight back into its attack.


The Shape: Linear Ramps
-----------------------

  Level
  start ┐     ╱╲
        │    ╱  ╲___________
  sus   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Held, with life = time - on:

    life <= attack           life / attack · start
    life <= attack + decay   start → sustain, linearly over `decay`
    otherwise                sustain

Released: first find the level the note had at the moment of release by
evaluating the held formula at life = off - on. Then ramp linearly from
that level to 0 over `release`, starting at `off`. Releasing mid-attack
therefore fades from wherever the attack had got to, with no jump.


Zero-Length Phases
------------------

A phase with zero (or negative) duration completes instantly instead of
dividing by zero: zero attack starts at `start`, zero decay jumps to
`sustain`, zero release drops to silence at `off`.

The result is clamped to 0 when it is negative or within machine epsilon
of zero, so "fully decayed" is an exact comparison for the mixer.
*/

/// Which part of the envelope a note is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    /// Released and decayed to silence.
    Finished,
}

/// ADSR constants. Immutable per instrument; not per-note state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack_time: f64,
    pub decay_time: f64,
    pub release_time: f64,
    /// Peak reached at the end of the attack.
    pub start_amplitude: f64,
    pub sustain_amplitude: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_time: 0.2,
            decay_time: 1.0,
            release_time: 1.0,
            start_amplitude: 1.0,
            sustain_amplitude: 0.5,
        }
    }
}

impl Envelope {
    /// Envelope peaking at 1.0. Negative times are treated as zero.
    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack_time: attack.max(0.0),
            decay_time: decay.max(0.0),
            release_time: release.max(0.0),
            start_amplitude: 1.0,
            sustain_amplitude: sustain,
        }
    }

    pub fn with_start_amplitude(mut self, start: f64) -> Self {
        self.start_amplitude = start;
        self
    }

    /// Amplitude at `time` for a note pressed at `on` and released at `off`.
    pub fn amplitude(&self, time: f64, on: f64, off: f64) -> f64 {
        let amplitude = if on > off {
            self.held_amplitude(time - on)
        } else {
            let release_amplitude = self.held_amplitude(off - on);
            let since_release = time - off;

            if self.release_time > 0.0 {
                (since_release / self.release_time) * (0.0 - release_amplitude) + release_amplitude
            } else if since_release < 0.0 {
                release_amplitude
            } else {
                0.0
            }
        };

        if amplitude <= f64::EPSILON {
            0.0
        } else {
            amplitude
        }
    }

    /// Stage of a note at `time`.
    pub fn stage(&self, time: f64, on: f64, off: f64) -> EnvelopeStage {
        if on > off {
            let life = time - on;
            if life <= self.attack_time {
                EnvelopeStage::Attack
            } else if life <= self.attack_time + self.decay_time {
                EnvelopeStage::Decay
            } else {
                EnvelopeStage::Sustain
            }
        } else if self.amplitude(time, on, off) > 0.0 {
            EnvelopeStage::Release
        } else {
            EnvelopeStage::Finished
        }
    }

    /// Attack → decay → sustain as a function of time since the press.
    fn held_amplitude(&self, life: f64) -> f64 {
        if life < 0.0 {
            return 0.0;
        }

        if life <= self.attack_time {
            return if self.attack_time > 0.0 {
                (life / self.attack_time) * self.start_amplitude
            } else {
                self.start_amplitude
            };
        }

        let decay_life = life - self.attack_time;
        if decay_life <= self.decay_time && self.decay_time > 0.0 {
            return (decay_life / self.decay_time)
                * (self.sustain_amplitude - self.start_amplitude)
                + self.start_amplitude;
        }

        self.sustain_amplitude
    }

    /// Longest time a released note can keep sounding.
    pub fn release_tail(&self) -> f64 {
        self.release_time
    }
}

/// An envelope that remembers its own trigger times.
///
/// The mixer never uses this (notes carry their own timestamps); it is a
/// convenience for driving a single envelope by hand.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeGate {
    envelope: Envelope,
    trigger_on: f64,
    trigger_off: f64,
    open: bool,
}

impl EnvelopeGate {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            trigger_on: 0.0,
            trigger_off: f64::NEG_INFINITY,
            open: false,
        }
    }

    /// Gate high at `time`.
    pub fn note_on(&mut self, time: f64) {
        self.trigger_on = time;
        self.open = true;
    }

    /// Gate low at `time`.
    pub fn note_off(&mut self, time: f64) {
        self.trigger_off = time;
        self.open = false;
    }

    pub fn amplitude(&self, time: f64) -> f64 {
        if !self.open && self.trigger_off == f64::NEG_INFINITY {
            // never triggered
            return 0.0;
        }
        self.envelope.amplitude(time, self.trigger_on, self.trigger_off)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}
