//! Benchmarks for a full kit summed through the voice pool.
//!
//! Simulates the worst bar of a pattern: every track fires on the same step
//! and the pool renders them all into one block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::{
    engine::allocator::VoicePool, graph::RenderCtx, sequencing::Pattern, voices, SynthType,
    VoiceParams,
};

use crate::BLOCK_SIZES;

/// One voice per track of the default kit, all starting at time 0.
fn fill_pool(pool: &mut VoicePool, tracks: usize) {
    let pattern = Pattern::new("bench", "Bench", 16);
    for track in pattern.tracks.iter().take(tracks) {
        let step = track.steps[0];
        let params = step.voice_params(track.oscillator());
        if let Some(voice) = voices::synthesize(track.synth_type, &params, 0.0) {
            pool.insert(voice);
        }
    }
}

pub fn bench_kit(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/kit");
    let ctx = RenderCtx::new(48_000.0, 0.0);
    let params = VoiceParams::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut scratch = vec![0.0f32; size];

        for tracks in [2, 4, 8] {
            group.bench_with_input(
                BenchmarkId::new(format!("{tracks}_tracks"), size),
                &size,
                |b, _| {
                    b.iter_batched_ref(
                        || {
                            let mut pool = VoicePool::new(64);
                            fill_pool(&mut pool, tracks);
                            pool
                        },
                        |pool| {
                            buffer.fill(0.0);
                            pool.render(black_box(&mut buffer), &mut scratch, black_box(&ctx), drop);
                        },
                        criterion::BatchSize::SmallInput,
                    )
                },
            );
        }

        // Dense hats: a full pool of overlapping closed hats
        group.bench_with_input(BenchmarkId::new("64_hats", size), &size, |b, _| {
            b.iter_batched_ref(
                || {
                    let mut pool = VoicePool::new(64);
                    for i in 0..64 {
                        let start = i as f64 * 1e-4;
                        if let Some(voice) = voices::synthesize(SynthType::Tr808Hat, &params, start) {
                            pool.insert(voice);
                        }
                    }
                    pool
                },
                |pool| {
                    buffer.fill(0.0);
                    pool.render(black_box(&mut buffer), &mut scratch, black_box(&ctx), drop);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
