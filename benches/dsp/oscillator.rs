//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polykey::dsp::{osc, Vibrato, Waveform};
use rand::{rngs::StdRng, SeedableRng};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let mut noise = StdRng::seed_from_u64(7);
    let vibrato = Vibrato::new(5.0, 0.001);

    let waveforms = [
        ("sine", Waveform::Sine),
        ("square", Waveform::Square),
        ("triangle", Waveform::Triangle),
        // 99 harmonics per sample
        ("analog_saw", Waveform::AnalogSaw),
        ("noise", Waveform::Noise),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        for (name, waveform) in waveforms {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, out) in buffer.iter_mut().enumerate() {
                        let t = i as f64 / SAMPLE_RATE;
                        *out = osc(black_box(440.0), t, waveform, vibrato, &mut noise);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
