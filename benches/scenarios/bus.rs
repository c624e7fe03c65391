//! Benchmarks for the effect bus.
//!
//! The bus runs once per block regardless of how many voices are playing, so
//! its cost is the fixed floor of every render callback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::engine::{
    bus::EffectBus,
    params::{BusParams, DelayUpdate, DistortionUpdate, ReverbUpdate},
};

use crate::BLOCK_SIZES;

pub fn bench_bus(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/bus");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.07).sin() * (-(i as f32) / size as f32).exp())
            .collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Default settings: delay and reverb sends open, distortion dry
        let mut bus = EffectBus::new(&BusParams::default(), sample_rate, 7);
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| {
                bus.process(black_box(&input), &mut left, &mut right);
            })
        });

        // Every send bypassed: only the master section works
        let mut params = BusParams::default();
        params.delay.apply(&DelayUpdate {
            bypass: Some(true),
            ..DelayUpdate::default()
        });
        params.reverb.apply(&ReverbUpdate {
            bypass: Some(true),
            ..ReverbUpdate::default()
        });
        params.distortion.apply(&DistortionUpdate {
            bypass: Some(true),
            ..DistortionUpdate::default()
        });
        let mut bus = EffectBus::new(&params, sample_rate, 7);
        group.bench_with_input(BenchmarkId::new("bypassed", size), &size, |b, _| {
            b.iter(|| {
                bus.process(black_box(&input), &mut left, &mut right);
            })
        });

        // Everything wet, longest room
        let mut params = BusParams::default();
        params.reverb.apply(&ReverbUpdate {
            size: Some(1.0),
            mix: Some(0.6),
            ..ReverbUpdate::default()
        });
        params.distortion.apply(&DistortionUpdate {
            drive: Some(0.8),
            mix: Some(0.5),
            ..DistortionUpdate::default()
        });
        let mut bus = EffectBus::new(&params, sample_rate, 7);
        group.bench_with_input(BenchmarkId::new("saturated", size), &size, |b, _| {
            b.iter(|| {
                bus.process(black_box(&input), &mut left, &mut right);
            })
        });
    }

    group.finish();
}
