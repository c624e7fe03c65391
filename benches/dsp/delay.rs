//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Delay times in samples at 48kHz
    let delay_times: &[f32] = &[
        480.0,   // 10ms
        18000.0, // 375ms, a dotted eighth at 120 BPM
        96000.0, // 2 seconds, the longest the bus allows
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let delay_ms = delay_samples / 48.0;

            let mut delay = DelayLine::with_duration(2.0, 48_000.0);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("render_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        delay.render(black_box(&mut buffer), black_box(delay_samples));
                    })
                },
            );
        }

        // Fractional reads, as when the delay time is being smoothed
        let mut delay = DelayLine::with_duration(2.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("fractional", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    let delay_time = 18000.0 + i as f32 * 0.37;
                    sum += delay.next_sample(black_box(sample), black_box(delay_time));
                }
                sum
            })
        });
    }

    group.finish();
}
