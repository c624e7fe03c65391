//! Benchmarks for waveshaping distortion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::distortion::{self, DistortionCharacter, ShaperCurve};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Table lookup, as the distortion send runs it
        for character in [
            DistortionCharacter::Soft,
            DistortionCharacter::Hard,
            DistortionCharacter::Fold,
        ] {
            let curve = ShaperCurve::new(character, 0.6);
            group.bench_with_input(
                BenchmarkId::new(format!("curve_{character:?}").to_lowercase(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for &sample in &input {
                            sum += curve.apply(black_box(sample));
                        }
                        sum
                    })
                },
            );
        }

        // Closed form, as the 909 kick runs it
        group.bench_with_input(BenchmarkId::new("kick_drive", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += distortion::kick_drive(black_box(sample), black_box(30.0));
                }
                sum
            })
        });
    }

    group.finish();
}
