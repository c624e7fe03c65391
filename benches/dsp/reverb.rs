//! Benchmarks for partitioned convolution.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::reverb::{Convolver, ImpulseResponse, PARTITION_SIZE};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Generate a test signal (impulse-like with some content)
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        for (name, room) in [("small_room", 0.1), ("medium_room", 0.5), ("large_room", 1.0)] {
            let response = ImpulseResponse::synthesize(room, sample_rate, 7);
            let mut convolver = Convolver::new(&response, PARTITION_SIZE);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &sample in &input {
                        let (l, r) = convolver.process(black_box(sample));
                        sum += l + r;
                    }
                    sum
                })
            });
        }
    }

    // Impulse synthesis runs on the control thread whenever size changes
    group.bench_function("synthesize_impulse", |b| {
        b.iter(|| ImpulseResponse::synthesize(black_box(0.5), sample_rate, 7))
    });

    group.finish();
}
