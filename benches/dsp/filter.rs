//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::filter::SVFilter;
use saavy_drums::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0, 0.0);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("lowpass", SVFilter::lowpass(1000.0)),
            ("highpass", SVFilter::highpass(1000.0)),
            ("bandpass", SVFilter::bandpass(1000.0)),
            ("notch", SVFilter::notch(1000.0)),
        ];

        for (name, filter) in filters {
            let mut filter = filter.with_q(2.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }

        // Per-sample cutoff, as automated voice filters run
        let mut filter = SVFilter::lowpass(1000.0);
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    let cutoff = 8000.0 - i as f32 * 10.0;
                    sum += filter.process(black_box(sample), black_box(cutoff), 48_000.0);
                }
                sum
            })
        });
    }

    group.finish();
}
