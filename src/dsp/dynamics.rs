/*
Dynamics: Compressor and Limiter
================================

Both processors are feed-forward: they measure the input level, decide how
much gain reduction that level deserves, smooth the reduction, and multiply.

    input ──┬───────────────────────────► × ──► output
            │                             ▲
            └─► level (dB) ─► gain computer ─► attack/release ─┘

Gain Computer (soft knee)
-------------------------

With threshold T, ratio R and knee width W (all dB), the static curve is:

    x - T < -W/2        y = x                                   (below knee)
    |x - T| <= W/2      y = x + (1/R - 1)(x - T + W/2)² / (2W)   (inside knee)
    x - T >  W/2        y = T + (x - T) / R                     (above knee)

The gain reduction is `y - x` dB (always <= 0).

Attack/Release
--------------

Reduction moves toward its target with a one-pole slew: the fast attack
coefficient while the reduction is deepening, the slow release coefficient
while it recovers.

The limiter is the same machine with R = ∞ and no knee, followed by a hard
clamp so nothing ever leaves the engine above full scale.
*/

use crate::dsp::filter::OnePole;

#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.abs().max(1.0e-6).log10()
}

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub knee_db: f32,
    pub attack: f32,
    pub release: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 4.0,
            knee_db: 6.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

impl CompressorSettings {
    /// Static gain reduction (dB, <= 0) for an input level in dB.
    pub fn gain_reduction_db(&self, level_db: f32) -> f32 {
        let over = level_db - self.threshold_db;
        let slope = 1.0 / self.ratio - 1.0;

        if 2.0 * over < -self.knee_db {
            0.0
        } else if self.knee_db > 0.0 && 2.0 * over.abs() <= self.knee_db {
            let x = over + self.knee_db / 2.0;
            slope * x * x / (2.0 * self.knee_db)
        } else {
            slope * over
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compressor {
    settings: CompressorSettings,
    attack_coef: f32,
    release_coef: f32,
    reduction: OnePole,
}

impl Compressor {
    pub fn new(settings: CompressorSettings, sample_rate: f32) -> Self {
        Self {
            settings,
            attack_coef: OnePole::coefficient(settings.attack, sample_rate),
            release_coef: OnePole::coefficient(settings.release, sample_rate),
            reduction: OnePole::default(),
        }
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    /// Current gain reduction in dB.
    pub fn reduction_db(&self) -> f32 {
        self.reduction.value()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let target = self.settings.gain_reduction_db(linear_to_db(sample));
        let coefficient = if target < self.reduction.value() {
            self.attack_coef
        } else {
            self.release_coef
        };
        let reduction = self.reduction.next(target, coefficient);
        sample * db_to_linear(reduction)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.reduction.reset(0.0);
    }
}

/// Brickwall-style peak limiter.
#[derive(Debug, Clone)]
pub struct Limiter {
    ceiling_db: f32,
    attack_coef: f32,
    release_coef: f32,
    reduction: OnePole,
}

impl Limiter {
    pub const DEFAULT_CEILING_DB: f32 = -0.3;

    pub fn new(sample_rate: f32) -> Self {
        Self::with_ceiling(Self::DEFAULT_CEILING_DB, sample_rate)
    }

    pub fn with_ceiling(ceiling_db: f32, sample_rate: f32) -> Self {
        Self {
            ceiling_db,
            attack_coef: OnePole::coefficient(0.001, sample_rate),
            release_coef: OnePole::coefficient(0.08, sample_rate),
            reduction: OnePole::default(),
        }
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let target = (self.ceiling_db - linear_to_db(sample)).min(0.0);
        let coefficient = if target < self.reduction.value() {
            self.attack_coef
        } else {
            self.release_coef
        };
        let reduction = self.reduction.next(target, coefficient);
        (sample * db_to_linear(reduction)).clamp(-1.0, 1.0)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.reduction.reset(0.0);
    }
}
