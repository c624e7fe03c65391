//! Benchmarks for automation curve evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::{dsp::Automation, graph::RenderCtx, ENV_FLOOR};

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let ctx = RenderCtx::new(48_000.0, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Percussive envelope: exponential attack then exponential decay
        let mut envelope = Automation::new(0.0)
            .set_value_at(ENV_FLOOR, 0.0)
            .exponential_ramp_to(1.0, 0.005)
            .exponential_ramp_to(ENV_FLOOR, 2.0);
        group.bench_with_input(BenchmarkId::new("percussive", size), &size, |b, _| {
            b.iter(|| {
                envelope.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Linear ramp (clap pulses, pitch glides)
        let mut ramp = Automation::new(0.0).linear_ramp_to(1.0, 1.0);
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, _| {
            b.iter(|| {
                ramp.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Constant value, the cheapest path
        let mut constant = Automation::constant(0.5);
        group.bench_with_input(BenchmarkId::new("constant", size), &size, |b, _| {
            b.iter(|| {
                constant.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
