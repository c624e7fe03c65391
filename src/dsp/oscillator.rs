use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::{rngs::SmallRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Oscillators and Noise
=====================

Periodic waveforms are generated from a phase accumulator running 0.0 → 1.0
once per cycle:

    phase += frequency / sample_rate

The frequency is read every sample so pitch envelopes and FM can drive it
directly.

Naive saw and square waves jump instantly between -1 and +1. Those jumps
contain energy far above Nyquist that folds back as inharmonic aliasing,
which is very audible on the 808 hi-hat (six square waves up to 9 kHz). We
smooth each discontinuity with a PolyBLEP residual: a two-sample polynomial
correction that approximates a band-limited step.

Noise comes from a small, fast PRNG. Pink noise runs white noise through
Paul Kellet's refined -3 dB/octave filter.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
    /// Rectangular wave with the given duty cycle (0.0 - 1.0).
    Pulse(f32),
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Produce one sample at `frequency` Hz and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let dt = (frequency / sample_rate).clamp(-0.5, 0.5);
        let phase = self.phase;

        let sample = match self.waveform {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Triangle => 1.0 - 4.0 * ((phase + 0.25).fract() - 0.5).abs(),
            OscillatorWaveform::Sawtooth => 2.0 * phase - 1.0 - poly_blep(phase, dt.abs()),
            OscillatorWaveform::Square => pulse(phase, 0.5, dt.abs()),
            OscillatorWaveform::Pulse(duty) => pulse(phase, duty.clamp(0.01, 0.99), dt.abs()),
        };

        self.phase = (phase + dt).rem_euclid(1.0);
        sample
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[inline]
fn pulse(phase: f32, duty: f32, dt: f32) -> f32 {
    let naive = if phase < duty { 1.0 } else { -1.0 };
    naive + poly_blep(phase, dt) - poly_blep((phase + 1.0 - duty).fract(), dt)
}

/// Polynomial band-limited step residual for a discontinuity at phase 0.
#[inline]
fn poly_blep(phase: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if phase < dt {
        let t = phase / dt;
        t + t - t * t - 1.0
    } else if phase > 1.0 - dt {
        let t = (phase - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseColor {
    White,
    Pink,
}

static NOISE_SEED: AtomicU64 = AtomicU64::new(0x5EED_0808);

/// A fresh seed so simultaneous noise voices are decorrelated.
pub fn next_noise_seed() -> u64 {
    NOISE_SEED
        .fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed)
        .rotate_left(17)
}

#[derive(Debug, Clone)]
pub struct NoiseSource {
    color: NoiseColor,
    rng: SmallRng,
    pink: [f32; 7],
}

impl NoiseSource {
    pub fn new(color: NoiseColor, seed: u64) -> Self {
        Self {
            color,
            rng: SmallRng::seed_from_u64(seed),
            pink: [0.0; 7],
        }
    }

    pub fn white() -> Self {
        Self::new(NoiseColor::White, next_noise_seed())
    }

    pub fn pink() -> Self {
        Self::new(NoiseColor::Pink, next_noise_seed())
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        match self.color {
            NoiseColor::White => white,
            NoiseColor::Pink => {
                let b = &mut self.pink;
                b[0] = 0.99886 * b[0] + white * 0.055_517_9;
                b[1] = 0.99332 * b[1] + white * 0.075_075_9;
                b[2] = 0.96900 * b[2] + white * 0.153_852;
                b[3] = 0.86650 * b[3] + white * 0.310_485_6;
                b[4] = 0.55000 * b[4] + white * 0.532_952_2;
                b[5] = -0.7616 * b[5] - white * 0.016_898;
                let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
                b[6] = white * 0.115_926;
                pink * 0.11
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(osc: &mut Oscillator, frequency: f32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|_| osc.next_sample(frequency, 48_000.0))
            .collect()
    }

    #[test]
    fn sine_matches_reference() {
        let mut osc = Oscillator::new(OscillatorWaveform::Sine);
        let buffer = render(&mut osc, 440.0, 64);
        let expected = (TAU * 440.0 * 12.0 / 48_000.0).sin();
        assert!((buffer[12] - expected).abs() < 1e-4);
    }

    #[test]
    fn triangle_starts_at_zero_and_rises() {
        let mut osc = Oscillator::new(OscillatorWaveform::Triangle);
        let buffer = render(&mut osc, 100.0, 4);
        assert!(buffer[0].abs() < 1e-6);
        assert!(buffer[1] > buffer[0]);
    }

    #[test]
    fn waveforms_stay_bounded() {
        for waveform in [
            OscillatorWaveform::Sine,
            OscillatorWaveform::Triangle,
            OscillatorWaveform::Sawtooth,
            OscillatorWaveform::Square,
            OscillatorWaveform::Pulse(0.25),
        ] {
            let mut osc = Oscillator::new(waveform);
            for sample in render(&mut osc, 3_000.0, 4_800) {
                assert!(sample.abs() <= 1.1, "{waveform:?} produced {sample}");
            }
        }
    }

    #[test]
    fn square_has_no_dc_offset() {
        let mut osc = Oscillator::new(OscillatorWaveform::Square);
        let buffer = render(&mut osc, 100.0, 4_800);
        let mean: f32 = buffer.iter().sum::<f32>() / buffer.len() as f32;
        assert!(mean.abs() < 0.01, "mean was {mean}");
    }

    #[test]
    fn noise_is_seeded_and_bounded() {
        let mut a = NoiseSource::new(NoiseColor::White, 7);
        let mut b = NoiseSource::new(NoiseColor::White, 7);
        for _ in 0..256 {
            let sample = a.next_sample();
            assert_eq!(sample, b.next_sample());
            assert!((-1.0..1.0).contains(&sample));
        }
    }

    #[test]
    fn pink_noise_is_quieter_than_white() {
        let mut white = NoiseSource::new(NoiseColor::White, 3);
        let mut pink = NoiseSource::new(NoiseColor::Pink, 3);
        let energy = |source: &mut NoiseSource| -> f32 {
            (0..48_000).map(|_| source.next_sample().powi(2)).sum()
        };
        assert!(energy(&mut pink) < energy(&mut white));
    }
}
