//! Benchmarks for the per-sample synthesis path.
//!
//! Run with: cargo bench
//!
//! Everything here runs once per output sample per channel, so budgets are
//! tight. Reference deadlines at 44.1kHz stereo:
//!   - 512 frames  = 11.6ms for 1024 mix calls
//!   - one sample  = ~11us
//!
//! Benchmark groups:
//!   - dsp/*        Oscillator and envelope evaluation
//!   - scenarios/*  Full engine mixes with several notes sounding

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Frames per device buffer worth benchmarking.
pub const BLOCK_SIZES: &[usize] = &[64, 256, 512];

pub const SAMPLE_RATE: f64 = 44_100.0;

criterion_group!(
    benches,
    dsp::bench_oscillator,
    dsp::bench_envelope,
    scenarios::bench_mix,
);
criterion_main!(benches);
