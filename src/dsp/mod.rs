//! Stateless signal math used by the instruments.
//!
//! Everything here is a pure function of its arguments (plus, for noise, an
//! explicitly passed random source). Nothing allocates, so all of it is safe
//! to call from the audio callback.

/// ADSR amplitude envelope evaluated from note timestamps.
pub mod envelope;
/// Waveform generation with optional vibrato.
pub mod oscillator;
/// Note index to frequency mapping.
pub mod scale;

pub use envelope::{Envelope, EnvelopeGate, EnvelopeStage};
pub use oscillator::{angular, osc, osc_by_id, Vibrato, Waveform};
pub use scale::{scale, Scale};
