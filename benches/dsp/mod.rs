//! Benchmarks for oscillator and envelope evaluation.

mod envelope;
mod oscillator;

pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
