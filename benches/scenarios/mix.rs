//! Benchmarks for the shared engine mix.
//!
//! These model a player holding chords: N notes live in the registry and
//! the audio thread asks for one mixed sample per frame.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polykey::synth::InstrumentKind;
use polykey::{SynthConfig, SynthEngine};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn engine_with_notes(kind: InstrumentKind, notes: i32) -> SynthEngine {
    let engine = SynthEngine::new(&SynthConfig::default().play_with(kind).seed(1));
    for id in 0..notes {
        engine.key_down(id, 0.0);
    }
    engine
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        for (kind, notes) in [
            (InstrumentKind::Bell, 1),
            (InstrumentKind::Bell, 4),
            (InstrumentKind::Harmonica, 4),
            // every key of the default layout
            (InstrumentKind::Bell, 16),
        ] {
            let engine = engine_with_notes(kind, notes);
            let name = format!("{kind}_{notes}_notes");

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, out) in buffer.iter_mut().enumerate() {
                        *out = engine.mix(black_box(0.1 + i as f64 / SAMPLE_RATE));
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
