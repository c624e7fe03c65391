use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type              | constructed by       | passes          | rejects      |
| ----------------- | -------------------- | --------------- | ------------ |
| low-pass          | LPF                  | below cutoff    | above cutoff |
| high-pass         | HPF                  | above cutoff    | below cutoff |
| band-pass         | LPF ∘ HPF (series)   | between cutoffs | outside      |
| notch / band-stop | LPF + HPF (parallel) | outside         | between      |

Resonance is expressed as Q. The damping term of the TPT state-variable core
is k = 1/Q, so Q = 0.707 is the flat Butterworth response and higher values
peak at the cutoff. The band-pass output is scaled by k so its peak gain is
0 dB at any Q, matching the usual "constant peak" band-pass.
*/

/// Butterworth Q, no resonant peak.
pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: DEFAULT_Q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass).with_cutoff(cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass).with_cutoff(cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass).with_cutoff(cutoff_hz)
    }

    pub fn notch(cutoff_hz: f32) -> Self {
        Self::new(FilterType::Notch).with_cutoff(cutoff_hz)
    }

    pub fn with_cutoff(mut self, cutoff_hz: f32) -> Self {
        self.cutoff_hz = cutoff_hz;
        self
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.set_q(q);
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Prewarped integrator gain for `cutoff_hz`.
    #[inline]
    pub fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.49);
        (PI * cutoff / sample_rate).tan()
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: k * v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter one sample at an explicit cutoff (used when the cutoff is automated).
    #[inline]
    pub fn process(&mut self, sample: f32, cutoff_hz: f32, sample_rate: f32) -> f32 {
        let g = Self::compute_g(cutoff_hz, sample_rate);
        let k = 1.0 / self.q;
        let outputs = self.next_sample(sample, k, g);
        self.select(outputs)
    }

    #[inline]
    fn select(&self, outputs: FilterOutputs) -> f32 {
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = Self::compute_g(self.cutoff_hz, ctx.sample_rate);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.clamp(0.1, 50.0);
    }
}

/// One-pole lowpass used for parameter smoothing and damping.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    state: f32,
}

impl OnePole {
    /// Coefficient for a smoothing time constant of `seconds`.
    pub fn coefficient(seconds: f32, sample_rate: f32) -> f32 {
        if seconds <= 0.0 {
            return 1.0;
        }
        1.0 - (-1.0 / (seconds * sample_rate)).exp()
    }

    #[inline]
    pub fn next(&mut self, target: f32, coefficient: f32) -> f32 {
        self.state += (target - self.state) * coefficient;
        self.state
    }

    pub fn value(&self) -> f32 {
        self.state
    }

    pub fn reset(&mut self, value: f32) {
        self.state = value;
    }
}
