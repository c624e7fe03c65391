//! Benchmarks for single drum voices.
//!
//! Each voice is rendered from its onset, where every layer (click, body,
//! noise) is still sounding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::{
    graph::RenderCtx,
    voices::{self, SampleBuffer, SampleOptions},
    SynthType, VoiceParams,
};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::new(48_000.0, 0.0);
    let params = VoiceParams::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut scratch = vec![0.0f32; size];

        for synth in SynthType::ALL.into_iter().filter(SynthType::is_synthesized) {
            group.bench_with_input(BenchmarkId::new(synth.as_str(), size), &size, |b, _| {
                b.iter_batched_ref(
                    || voices::synthesize(synth, &params, 0.0).unwrap(),
                    |voice| {
                        buffer.fill(0.0);
                        voice.render_into(black_box(&mut buffer), &mut scratch, black_box(&ctx));
                    },
                    criterion::BatchSize::SmallInput,
                )
            });
        }

        // Sample playback at a transposed rate
        let sample = SampleBuffer::new(
            (0..48_000).map(|i| (i as f32 * 0.01).sin()).collect::<Vec<_>>(),
            48_000,
        );
        let options = SampleOptions {
            pitch: 3.0,
            decay: Some(50.0),
            ..SampleOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("sample", size), &size, |b, _| {
            b.iter_batched_ref(
                || voices::sample_voice(&sample, &options, 0.0),
                |voice| {
                    buffer.fill(0.0);
                    voice.render_into(black_box(&mut buffer), &mut scratch, black_box(&ctx));
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
