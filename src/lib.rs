pub mod config;
pub mod dsp; // Oscillators, envelopes, pitch
pub mod error;
pub mod io; // Audio device, clock, keyboard
pub mod synth; // Notes, instruments and the shared mix

pub use config::{OutputSettings, RouteConfig, SynthConfig};
pub use error::{Error, Result};
pub use synth::{NoteEvent, SynthEngine};
