//! Drum voices.
//!
//! Each voice is a one-shot node graph built on the control thread for one
//! hit: every oscillator pitch, filter sweep and envelope is scheduled against
//! the absolute audio clock at construction, then the whole graph is handed
//! to the renderer and never touched again. The renderer retires it after its
//! `stop` time.
//!
//! # Example
//!
//! ```ignore
//! use saavy_drums::voices::{self, SynthType, VoiceParams};
//!
//! let params = VoiceParams { decay: 0.7, tuning: 0.2, ..VoiceParams::default() };
//! let kick = voices::synthesize(SynthType::Tr808Kick, &params, 1.0).unwrap();
//! assert_eq!(kick.start(), 1.0);
//! ```

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::automation::Automation,
    graph::node::{GraphNode, RenderCtx},
};

mod analog;
mod clap;
mod fm;
mod hihat;
mod kick;
mod noise;
pub mod sample;
mod snare;
mod tom;

pub use analog::analog_drum;
pub use clap::{tr808_clap, REBOUND_ATTENUATION, REBOUND_COUNT, REBOUND_LENGTH, REBOUND_SPACING};
pub use fm::fm_drum;
pub use hihat::tr808_hat;
pub use kick::{tr808_kick, tr909_kick};
pub use noise::noise_drum;
pub use sample::{sample_voice, SampleBank, SampleBuffer, SampleOptions};
pub use snare::{tr808_snare, tr909_snare};
pub use tom::{tr808_tom, tr909_tom};

/// Time every voice keeps its slot after the amplitude envelope ends, so
/// filters and shapers can ring out.
pub const RELEASE_TAIL: f64 = 0.05;

/// How a track makes its sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynthType {
    Sample,
    Tr808Kick,
    Tr808Snare,
    Tr808Hat,
    Tr808Tom,
    Tr808Clap,
    Tr909Kick,
    Tr909Snare,
    Tr909Tom,
    NoiseDrum,
    FmDrum,
    AnalogDrum,
}

impl SynthType {
    pub const ALL: [SynthType; 12] = [
        SynthType::Sample,
        SynthType::Tr808Kick,
        SynthType::Tr808Snare,
        SynthType::Tr808Hat,
        SynthType::Tr808Tom,
        SynthType::Tr808Clap,
        SynthType::Tr909Kick,
        SynthType::Tr909Snare,
        SynthType::Tr909Tom,
        SynthType::NoiseDrum,
        SynthType::FmDrum,
        SynthType::AnalogDrum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SynthType::Sample => "sample",
            SynthType::Tr808Kick => "tr808_kick",
            SynthType::Tr808Snare => "tr808_snare",
            SynthType::Tr808Hat => "tr808_hat",
            SynthType::Tr808Tom => "tr808_tom",
            SynthType::Tr808Clap => "tr808_clap",
            SynthType::Tr909Kick => "tr909_kick",
            SynthType::Tr909Snare => "tr909_snare",
            SynthType::Tr909Tom => "tr909_tom",
            SynthType::NoiseDrum => "noise_drum",
            SynthType::FmDrum => "fm_drum",
            SynthType::AnalogDrum => "analog_drum",
        }
    }

    /// Whether this type has a synthesis algorithm.
    pub fn is_synthesized(&self) -> bool {
        !matches!(self, SynthType::Sample)
    }

    /// Sample played in place of this voice when synthesis is unavailable.
    pub fn fallback_sample(&self) -> Option<&'static str> {
        match self {
            SynthType::Sample => None,
            SynthType::Tr808Kick | SynthType::Tr909Kick => Some("samples/kick.wav"),
            SynthType::Tr808Snare | SynthType::Tr909Snare => Some("samples/snare.wav"),
            SynthType::Tr808Hat => Some("samples/hihat.wav"),
            SynthType::Tr808Clap => Some("samples/clap.wav"),
            SynthType::Tr909Tom => Some("samples/tom_low.wav"),
            SynthType::Tr808Tom => Some("samples/tom_high.wav"),
            SynthType::NoiseDrum => Some("samples/crash.wav"),
            SynthType::FmDrum | SynthType::AnalogDrum => Some("samples/perc.wav"),
        }
    }
}

impl fmt::Display for SynthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SynthType::ALL
            .into_iter()
            .find(|synth| synth.as_str() == s)
            .ok_or_else(|| format!("unknown synth type: {s}"))
    }
}

/// Source of the generic analog drum voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OscillatorType {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
    Pulse,
    BridgedT,
    NoiseWhite,
    NoisePink,
}

/// Normalized synthesis inputs, each 0.0 - 1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub velocity: f32,
    pub decay: f32,
    pub tone: f32,
    pub tuning: f32,
    pub attack: f32,
    pub snappy: f32,
    pub color: f32,
    pub oscillator: OscillatorType,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            velocity: 100.0 / 127.0,
            decay: 0.5,
            tone: 0.5,
            tuning: 0.5,
            attack: 0.5,
            snappy: 0.5,
            color: 0.5,
            oscillator: OscillatorType::Sine,
        }
    }
}

impl VoiceParams {
    /// Copy with every field forced into 0.0 - 1.0 (NaN becomes 0).
    pub fn clamped(self) -> Self {
        let unit = |x: f32| if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        Self {
            velocity: unit(self.velocity),
            decay: unit(self.decay),
            tone: unit(self.tone),
            tuning: unit(self.tuning),
            attack: unit(self.attack),
            snappy: unit(self.snappy),
            color: unit(self.color),
            oscillator: self.oscillator,
        }
    }
}

/// One scheduled hit: a boxed node graph plus its lifetime on the audio clock.
pub struct DrumVoice {
    graph: Box<dyn GraphNode>,
    amplitude: Automation,
    start: f64,
    envelope_end: f64,
    stop: f64,
}

impl DrumVoice {
    /// A synthesized voice whose amplitude envelope ends `decay` seconds
    /// after `start`.
    pub fn new(graph: Box<dyn GraphNode>, amplitude: Automation, start: f64, decay: f64) -> Self {
        let envelope_end = start + decay.max(0.0);
        Self {
            graph,
            amplitude,
            start,
            envelope_end,
            stop: envelope_end + RELEASE_TAIL,
        }
    }

    /// Override the time the renderer frees the slot.
    pub fn with_stop(mut self, stop: f64) -> Self {
        self.stop = stop.max(self.start);
        self
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn envelope_end(&self) -> f64 {
        self.envelope_end
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// The master amplitude envelope of the hit.
    pub fn amplitude(&self) -> &Automation {
        &self.amplitude
    }

    /// True once nothing more can be heard from this voice at `time`.
    pub fn is_finished(&self, time: f64) -> bool {
        time >= self.stop || (time > self.start && !self.graph.is_active(time))
    }

    /// Add this voice's output for the block into `out` via `scratch`.
    pub fn render_into(&mut self, out: &mut [f32], scratch: &mut [f32], ctx: &RenderCtx) {
        let scratch = &mut scratch[..out.len()];
        scratch.fill(0.0);
        self.graph.render_block(scratch, ctx);
        crate::dsp::mix::sum_in_place(out, scratch);
    }
}

impl fmt::Debug for DrumVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrumVoice")
            .field("start", &self.start)
            .field("envelope_end", &self.envelope_end)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

/// Build the voice for `synth_type` at `time`. `Sample` has no algorithm.
pub fn synthesize(synth_type: SynthType, params: &VoiceParams, time: f64) -> Option<DrumVoice> {
    let params = params.clamped();
    let voice = match synth_type {
        SynthType::Sample => return None,
        SynthType::Tr808Kick => tr808_kick(&params, time),
        SynthType::Tr808Snare => tr808_snare(&params, time),
        SynthType::Tr808Hat => tr808_hat(&params, time),
        SynthType::Tr808Tom => tr808_tom(&params, time),
        SynthType::Tr808Clap => tr808_clap(&params, time),
        SynthType::Tr909Kick => tr909_kick(&params, time),
        SynthType::Tr909Snare => tr909_snare(&params, time),
        SynthType::Tr909Tom => tr909_tom(&params, time),
        SynthType::NoiseDrum => noise_drum(&params, time),
        SynthType::FmDrum => fm_drum(&params, time),
        SynthType::AnalogDrum => analog_drum(&params, time),
    };
    Some(voice)
}
