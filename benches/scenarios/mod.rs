//! Full-engine scenarios: a registry of notes mixed sample by sample.

mod mix;

pub use mix::bench_mix;
