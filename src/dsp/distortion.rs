//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. A waveshaper applies
//! a transfer function to each sample:
//!
//!   output = f(input)
//!
//! # Bus curves
//!
//! The send bus builds its curve from a character and a drive amount
//! (`amount = 1 + drive · 100`):
//!
//! Soft (tanh):
//!   f(x) = tanh(x · amount)
//!   - Smooth, warm saturation that gradually compresses peaks
//!
//! Hard clip:
//!   f(x) = clamp(x · amount, -1, 1)
//!   - Harsh, buzzy, rich in odd harmonics
//!
//! Fold (sine):
//!   f(x) = sin(x · amount · π/2)
//!   - The signal wraps back on itself past full scale
//!   - Complex, metallic harmonics
//!
//! The curve is sampled into a table once per parameter change and read with
//! linear interpolation, so the audio thread never evaluates `tanh` or `sin`.
//!
//! # Voice shapers
//!
//! Voices use closed-form shapers instead: they are built per hit and a table
//! would need a heap allocation.
//!
//! Kick drive:
//!   f(x) = (π + k) · x / (π + k · |x|)
//!   - k = 0 is linear; larger k squares the waveform off
//!   - Unity at x = ±1 for every k, so drive never changes peak level

use std::f32::consts::{FRAC_PI_2, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points in a bus distortion table.
pub const CURVE_SIZE: usize = 4096;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistortionCharacter {
    #[default]
    Soft,
    Hard,
    Fold,
}

/// Curve amount for a normalized drive (0.0 - 1.0).
#[inline]
pub fn drive_amount(drive: f32) -> f32 {
    1.0 + drive.clamp(0.0, 1.0) * 100.0
}

/// Soft saturation, `tanh(x · amount)`.
#[inline]
pub fn soft_clip(sample: f32, amount: f32) -> f32 {
    (sample * amount).tanh()
}

/// Hard clipping at full scale.
#[inline]
pub fn hard_clip(sample: f32, amount: f32) -> f32 {
    (sample * amount).clamp(-1.0, 1.0)
}

/// Sine foldback.
#[inline]
pub fn fold(sample: f32, amount: f32) -> f32 {
    (sample * amount * FRAC_PI_2).sin()
}

/// The 909 kick's drive curve, `(π + k)x / (π + k|x|)`.
#[inline]
pub fn kick_drive(sample: f32, k: f32) -> f32 {
    (PI + k) * sample / (PI + k * sample.abs())
}

/// Sampled transfer curve covering inputs in [-1, 1].
#[derive(Debug, Clone)]
pub struct ShaperCurve {
    table: Vec<f32>,
}

impl ShaperCurve {
    /// Sample `character` at `drive` into a table.
    pub fn new(character: DistortionCharacter, drive: f32) -> Self {
        let amount = drive_amount(drive);
        let shape: fn(f32, f32) -> f32 = match character {
            DistortionCharacter::Soft => soft_clip,
            DistortionCharacter::Hard => hard_clip,
            DistortionCharacter::Fold => fold,
        };

        let last = (CURVE_SIZE - 1) as f32;
        let table = (0..CURVE_SIZE)
            .map(|i| shape(i as f32 * 2.0 / last - 1.0, amount))
            .collect();

        Self { table }
    }

    /// Look up `sample`; inputs beyond [-1, 1] read the end points.
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        let last = self.table.len() - 1;
        let position = ((sample.clamp(-1.0, 1.0) + 1.0) * 0.5) * last as f32;
        let index = (position as usize).min(last - 1);
        let frac = position - index as f32;
        self.table[index] + (self.table[index + 1] - self.table[index]) * frac
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
