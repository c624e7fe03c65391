//! Benchmarks for the master compressor and limiter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::dynamics::{Compressor, CompressorSettings, Limiter};

use crate::BLOCK_SIZES;

pub fn bench_dynamics(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/dynamics");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Hot signal so gain reduction is always engaged
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 1.5).collect();

        let mut compressor = Compressor::new(CompressorSettings::default(), sample_rate);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("compressor", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                compressor.render(black_box(&mut buffer));
            })
        });

        let mut limiter = Limiter::new(sample_rate);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("limiter", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                limiter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
