//! Benchmarks for ADSR amplitude evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polykey::dsp::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let env = Envelope::adsr(0.01, 1.0, 0.5, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Attack/decay branch
        group.bench_with_input(BenchmarkId::new("held", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    let t = i as f64 / SAMPLE_RATE;
                    *out = env.amplitude(black_box(t), 0.0, f64::NEG_INFINITY);
                }
                black_box(&buffer);
            })
        });

        // Release branch re-derives the held level every sample
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    let t = 0.5 + i as f64 / SAMPLE_RATE;
                    *out = env.amplitude(black_box(t), 0.0, 0.4);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
