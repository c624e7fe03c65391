//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_drums::dsp::oscillator::{NoiseSource, Oscillator, OscillatorWaveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let waveforms = [
            ("sine", OscillatorWaveform::Sine),
            ("triangle", OscillatorWaveform::Triangle),
            ("sawtooth", OscillatorWaveform::Sawtooth),
            ("square", OscillatorWaveform::Square),
            ("pulse", OscillatorWaveform::Pulse(0.3)),
        ];

        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(waveform);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample(black_box(440.0), sample_rate);
                    }
                })
            });
        }

        let mut white = NoiseSource::white();
        group.bench_with_input(BenchmarkId::new("noise_white", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = white.next_sample();
                }
            })
        });

        let mut pink = NoiseSource::pink();
        group.bench_with_input(BenchmarkId::new("noise_pink", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = pink.next_sample();
                }
            })
        });
    }

    group.finish();
}
